//! Personal invoicing: records, assembly of an invoice from stored
//! profiles and templates, persistence, configuration and the one-page
//! PDF layout.

pub mod assembly;
pub mod config;
pub mod error;
pub mod format;
pub mod layout;
pub mod model;
pub mod store;

pub use assembly::{
    ensure_deletable, next_invoice_number, parse_invoice_number, Defaults, DraftEdits, InvoiceDraft, Selection,
};
pub use config::Config;
pub use error::{AssemblyError, ConfigError, RenderError, StoreError};
pub use format::{
    format_date_range_slash, format_long_date, invoice_file_name, month_bounds, month_bounds_from, recent_months,
    MonthBounds,
};
pub use layout::{render_invoice, render_invoice_with, FontChoice, LayoutOptions};
pub use model::{
    BankDetails, ClientInfo, ClientTemplate, DefaultService, InvoiceData, SenderInfo, SenderProfile, ServiceItem,
};
pub use store::{InvoiceStore, JsonFileStore, MemoryStore};

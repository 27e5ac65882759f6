//! Minimal single-purpose PDF writer used to lay out invoices.
//!
//! Provides an object model, a byte-offset tracking serializer, a page
//! API with text and vector graphics, the Helvetica pair of standard
//! fonts and embedded TrueType programs.

pub mod document;
pub mod error;
pub mod fonts;
pub mod graphics;
pub mod objects;
pub mod truetype;
pub mod writer;

pub use document::PdfDocument;
pub use error::PdfError;
pub use fonts::{BuiltinFont, FontMetrics, FontRef, TextStyle, TrueTypeFontId};
pub use graphics::Color;

//! Single-page A4 invoice layout.
//!
//! Everything is placed with a top-down cursor on a fixed grid; there is
//! no wrapping and no pagination. The same [`InvoiceData`] always renders
//! to the same bytes.

use invoice_pdf::{BuiltinFont, Color, FontRef, PdfDocument, PdfError, TextStyle};

use crate::error::RenderError;
use crate::model::{BankDetails, ClientInfo, InvoiceData, SenderInfo, ServiceItem};

pub const PAGE_WIDTH: f64 = 595.0;
pub const PAGE_HEIGHT: f64 = 842.0;
pub const MARGIN: f64 = 50.0;

const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;
const COLUMN_WIDTH: f64 = CONTENT_WIDTH / 2.0;

const SERVICE_COL_WIDTH: f64 = 220.0;
const PERIOD_COL_WIDTH: f64 = 140.0;
const CELL_PADDING: f64 = 10.0;
const SERVICE_X: f64 = MARGIN + CELL_PADDING;
const PERIOD_X: f64 = MARGIN + SERVICE_COL_WIDTH + CELL_PADDING;
const PRICE_X: f64 = MARGIN + SERVICE_COL_WIDTH + PERIOD_COL_WIDTH + CELL_PADDING;
const TOTAL_LABEL_X: f64 = MARGIN + SERVICE_COL_WIDTH + PERIOD_COL_WIDTH - 40.0;

const BLACK: Color = Color::BLACK;
const DARK_GRAY: Color = Color::gray(0.2);
const MID_GRAY: Color = Color::gray(0.4);
const HEADER_SHADE: Color = Color::gray(0.95);

const CREATOR: &str = "invoice-core";

/// Which font programs the two weights are set in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FontChoice {
    /// Standard Helvetica / Helvetica-Bold, referenced but not embedded.
    #[default]
    Builtin,
    /// Two TrueType programs, embedded into the document.
    Embedded { regular: Vec<u8>, bold: Vec<u8> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutOptions {
    pub fonts: FontChoice,
    /// Flate-compress content and font streams.
    pub compress: bool,
}

#[derive(Clone, Copy)]
enum Weight {
    Regular,
    Bold,
}

/// Render an invoice with the standard fonts and no compression.
pub fn render_invoice(data: &InvoiceData) -> Result<Vec<u8>, RenderError> {
    render_invoice_with(data, &LayoutOptions::default())
}

/// Render an invoice into a complete single-page PDF.
///
/// Fails with [`RenderError::NoServices`] for an empty service list and
/// with [`RenderError::Pdf`] when a field contains a character the chosen
/// font cannot encode. No bytes are returned on failure.
pub fn render_invoice_with(data: &InvoiceData, options: &LayoutOptions) -> Result<Vec<u8>, RenderError> {
    if data.services.is_empty() {
        return Err(RenderError::NoServices);
    }

    let mut doc = PdfDocument::new(Vec::new())?;
    doc.set_compression(options.compress)
        .set_info("Title", &format!("Invoice #{}", data.invoice_number))
        .set_info("Creator", CREATOR);

    let (regular, bold): (FontRef, FontRef) = match &options.fonts {
        FontChoice::Builtin => (BuiltinFont::Helvetica.into(), BuiltinFont::HelveticaBold.into()),
        FontChoice::Embedded { regular, bold } => {
            (doc.load_font_bytes(regular.clone())?, doc.load_font_bytes(bold.clone())?)
        }
    };

    doc.begin_page(PAGE_WIDTH, PAGE_HEIGHT)?;
    let mut page = Page {
        doc: &mut doc,
        regular,
        bold,
        y: PAGE_HEIGHT - MARGIN,
    };
    page.heading(&data.invoice_number, &data.date)?;
    page.parties(&data.sender, &data.client)?;
    page.services(&data.services)?;
    page.total(&data.total)?;
    page.bank_details(&data.bank_details)?;
    if let Some(evm_address) = data.evm_address.as_deref().filter(|a| !a.trim().is_empty()) {
        page.evm_address(evm_address)?;
    }
    tracing::debug!(invoice = %data.invoice_number, cursor = page.y, "invoice laid out");

    Ok(doc.end_document()?)
}

/// Drawing state for the one page: the document, the resolved font pair
/// and the vertical cursor.
struct Page<'a> {
    doc: &'a mut PdfDocument<Vec<u8>>,
    regular: FontRef,
    bold: FontRef,
    y: f64,
}

impl Page<'_> {
    fn style(&self, weight: Weight, size: f64) -> TextStyle {
        match weight {
            Weight::Regular => TextStyle::new(self.regular, size),
            Weight::Bold => TextStyle::new(self.bold, size),
        }
    }

    fn text(&mut self, text: &str, x: f64, y: f64, weight: Weight, size: f64, color: Color) -> Result<(), PdfError> {
        let style = self.style(weight, size);
        self.doc.set_fill_color(color)?;
        self.doc.place_text_styled(text, x, y, &style)?;
        Ok(())
    }

    /// A table cell; overflowing text is still drawn as-is.
    fn cell(&mut self, text: &str, x: f64, right_edge: f64, weight: Weight) -> Result<(), PdfError> {
        let width = self.doc.measure_text(text, &self.style(weight, 10.0))?;
        if x + width > right_edge {
            tracing::debug!(text, width, available = right_edge - x, "table cell overflows its column");
        }
        self.text(text, x, self.y, weight, 10.0, DARK_GRAY)
    }

    fn heading(&mut self, invoice_number: &str, date: &str) -> Result<(), PdfError> {
        self.text(&format!("INVOICE #{}", invoice_number), MARGIN, self.y, Weight::Bold, 28.0, BLACK)?;
        self.y -= 35.0;

        self.text("Date:", MARGIN, self.y, Weight::Bold, 10.0, MID_GRAY)?;
        self.y -= 15.0;
        self.text(date, MARGIN, self.y, Weight::Regular, 11.0, DARK_GRAY)?;
        self.y -= 40.0;
        Ok(())
    }

    fn parties(&mut self, sender: &SenderInfo, client: &ClientInfo) -> Result<(), PdfError> {
        let x = MARGIN;
        let mut left_y = self.y;
        self.text("From:", x, left_y, Weight::Bold, 10.0, MID_GRAY)?;
        left_y -= 18.0;
        self.text(&sender.name, x, left_y, Weight::Regular, 11.0, DARK_GRAY)?;
        left_y -= 15.0;
        let locality = format!("{}, {},", sender.country, sender.city);
        for (i, line) in [&locality, &sender.address, &sender.email, &sender.phone]
            .into_iter()
            .enumerate()
        {
            if i > 0 {
                left_y -= 13.0;
            }
            self.text(line, x, left_y, Weight::Regular, 10.0, MID_GRAY)?;
        }

        let x = MARGIN + COLUMN_WIDTH;
        let mut right_y = self.y;
        self.text("Billed to:", x, right_y, Weight::Bold, 10.0, MID_GRAY)?;
        right_y -= 18.0;
        self.text(&client.name, x, right_y, Weight::Regular, 11.0, DARK_GRAY)?;
        right_y -= 15.0;
        self.text(&client.address_line1, x, right_y, Weight::Regular, 10.0, MID_GRAY)?;
        right_y -= 13.0;
        self.text(&client.address_line2, x, right_y, Weight::Regular, 10.0, MID_GRAY)?;
        if let Some(line3) = client.address_line3.as_deref().filter(|l| !l.trim().is_empty()) {
            right_y -= 13.0;
            self.text(line3, x, right_y, Weight::Regular, 10.0, MID_GRAY)?;
        }

        self.y = left_y.min(right_y) - 40.0;
        Ok(())
    }

    fn services(&mut self, services: &[ServiceItem]) -> Result<(), PdfError> {
        self.doc.set_fill_color(HEADER_SHADE)?;
        self.doc.rect(MARGIN, self.y - 5.0, CONTENT_WIDTH, 25.0)?.fill()?;
        let label_y = self.y + 5.0;
        self.text("Service", SERVICE_X, label_y, Weight::Bold, 10.0, DARK_GRAY)?;
        self.text("Time Period", PERIOD_X, label_y, Weight::Bold, 10.0, DARK_GRAY)?;
        self.text("Price", PRICE_X, label_y, Weight::Bold, 10.0, DARK_GRAY)?;
        self.y -= 35.0;

        for service in services {
            self.cell(&service.description, SERVICE_X, PERIOD_X - CELL_PADDING, Weight::Regular)?;
            self.cell(&service.time_period, PERIOD_X, PRICE_X - CELL_PADDING, Weight::Regular)?;
            self.cell(&service.price, PRICE_X, PAGE_WIDTH - MARGIN, Weight::Bold)?;
            self.y -= 25.0;
        }

        self.y -= 10.0;
        self.doc.save_state()?;
        self.doc.set_stroke_color(HEADER_SHADE)?;
        self.doc.set_line_width(1.0)?;
        self.doc
            .move_to(MARGIN, self.y)?
            .line_to(PAGE_WIDTH - MARGIN, self.y)?
            .stroke()?;
        self.doc.restore_state()?;
        self.y -= 25.0;
        Ok(())
    }

    fn total(&mut self, total: &str) -> Result<(), PdfError> {
        self.text("Total", TOTAL_LABEL_X, self.y, Weight::Bold, 12.0, DARK_GRAY)?;
        self.text(total, PRICE_X, self.y, Weight::Bold, 14.0, BLACK)?;
        self.y -= 50.0;
        Ok(())
    }

    fn bank_details(&mut self, bank: &BankDetails) -> Result<(), PdfError> {
        self.text("Bank details", MARGIN, self.y, Weight::Bold, 12.0, DARK_GRAY)?;
        self.y -= 20.0;
        self.text(
            &format!("Bank Name: {} {}", bank.bank_name, bank.bank_address),
            MARGIN,
            self.y,
            Weight::Regular,
            9.0,
            MID_GRAY,
        )?;
        self.y -= 14.0;
        self.text(
            &format!(
                "Beneficiary name and address: {}, {}",
                bank.beneficiary_name, bank.beneficiary_address
            ),
            MARGIN,
            self.y,
            Weight::Regular,
            9.0,
            MID_GRAY,
        )?;
        self.y -= 20.0;
        self.text(&format!("IBAN: {}", bank.iban), MARGIN, self.y, Weight::Bold, 12.0, DARK_GRAY)?;
        self.y -= 18.0;
        self.text(&format!("SWIFT/BIC: {}", bank.swift_bic), MARGIN, self.y, Weight::Bold, 12.0, DARK_GRAY)?;
        Ok(())
    }

    fn evm_address(&mut self, address: &str) -> Result<(), PdfError> {
        self.y -= 30.0;
        self.text(&format!("EVM Address: {}", address), MARGIN, self.y, Weight::Regular, 10.0, MID_GRAY)
    }
}

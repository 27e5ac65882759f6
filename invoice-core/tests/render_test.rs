//! Rendered invoices are opened with an independent parser and their shown
//! text compared against the input record.

use invoice_core::{
    render_invoice, render_invoice_with, BankDetails, ClientInfo, FontChoice, InvoiceData, LayoutOptions, RenderError,
    SenderInfo, ServiceItem,
};
use invoice_pdf::PdfError;
use lopdf::content::Content;
use lopdf::{Document, Object};

const DEJAVU_SANS: &[u8] = include_bytes!("../../invoice-pdf/tests/fixtures/DejaVuSans.ttf");
const DEJAVU_SANS_BOLD: &[u8] = include_bytes!("../../invoice-pdf/tests/fixtures/DejaVuSans-Bold.ttf");

fn invoice() -> InvoiceData {
    InvoiceData {
        invoice_number: "42".into(),
        date: "1 December, 2025".into(),
        sender: SenderInfo {
            name: "Jane Roe".into(),
            country: "Portugal".into(),
            city: "Lisbon".into(),
            address: "Rua Augusta 1".into(),
            email: "jane@example.com".into(),
            phone: "+351 000".into(),
        },
        client: ClientInfo {
            name: "Acme Corp".into(),
            address_line1: "1 Main St".into(),
            address_line2: "Springfield".into(),
            address_line3: None,
        },
        services: vec![ServiceItem {
            description: "Consulting".into(),
            time_period: "01/12/25 - 31/12/25".into(),
            price: "$3300".into(),
        }],
        total: "$3300".into(),
        bank_details: BankDetails {
            bank_name: "Banco".into(),
            bank_address: "Praça 1".into(),
            beneficiary_name: "Jane Roe".into(),
            beneficiary_address: "Lisbon, Portugal".into(),
            iban: "PT50 0002 0123".into(),
            swift_bic: "BANKPTPL".into(),
        },
        evm_address: None,
    }
}

/// Every `Tj` operand on the single page, decoded from WinAnsi.
fn shown_text(bytes: &[u8]) -> Vec<String> {
    let pdf = Document::load_mem(bytes).expect("rendered invoice should parse");
    let pages = pdf.get_pages();
    assert_eq!(pages.len(), 1, "invoice is always one page");
    let page_id = *pages.values().next().unwrap();
    let content = Content::decode(&pdf.get_page_content(page_id).unwrap()).unwrap();
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(raw, _)) => Some(raw.iter().map(|&b| b as char).collect::<String>()),
            _ => None,
        })
        .collect()
}

#[test]
fn all_fields_are_shown_in_reading_order() {
    let text = shown_text(&render_invoice(&invoice()).unwrap());
    assert_eq!(
        text,
        vec![
            "INVOICE #42",
            "Date:",
            "1 December, 2025",
            "From:",
            "Jane Roe",
            "Portugal, Lisbon,",
            "Rua Augusta 1",
            "jane@example.com",
            "+351 000",
            "Billed to:",
            "Acme Corp",
            "1 Main St",
            "Springfield",
            "Service",
            "Time Period",
            "Price",
            "Consulting",
            "01/12/25 - 31/12/25",
            "$3300",
            "Total",
            "$3300",
            "Bank details",
            "Bank Name: Banco Praça 1",
            "Beneficiary name and address: Jane Roe, Lisbon, Portugal",
            "IBAN: PT50 0002 0123",
            "SWIFT/BIC: BANKPTPL",
        ]
    );
}

#[test]
fn optional_lines_appear_only_when_present() {
    let mut data = invoice();
    data.client.address_line3 = Some("Portugal".into());
    data.evm_address = Some("0x1234abcd".into());
    let text = shown_text(&render_invoice(&data).unwrap());
    assert_eq!(text.iter().filter(|t| t.as_str() == "Portugal").count(), 1);
    assert_eq!(text.last().map(String::as_str), Some("EVM Address: 0x1234abcd"));

    data.evm_address = Some("   ".into());
    let text = shown_text(&render_invoice(&data).unwrap());
    assert!(!text.iter().any(|t| t.starts_with("EVM")));
}

#[test]
fn every_service_gets_a_row() {
    let mut data = invoice();
    data.services.push(ServiceItem {
        description: "Hosting".into(),
        time_period: "01/12/25 - 31/12/25".into(),
        price: "$20".into(),
    });
    let bytes = render_invoice(&data).unwrap();
    let text = shown_text(&bytes);
    let hosting = text.iter().position(|t| t == "Hosting").unwrap();
    assert_eq!(text[hosting + 2], "$20");
    // second row sits 25pt under the first
    let raw = String::from_utf8_lossy(&bytes);
    assert!(raw.contains("60 555 Td\n(Consulting) Tj"));
    assert!(raw.contains("60 530 Td\n(Hosting) Tj"));
}

#[test]
fn rendering_is_deterministic() {
    let data = invoice();
    assert_eq!(render_invoice(&data).unwrap(), render_invoice(&data).unwrap());

    let options = LayoutOptions {
        compress: true,
        ..LayoutOptions::default()
    };
    let packed = render_invoice_with(&data, &options).unwrap();
    assert_eq!(packed, render_invoice_with(&data, &options).unwrap());
    assert_eq!(shown_text(&packed), shown_text(&render_invoice(&data).unwrap()));
}

#[test]
fn title_names_the_invoice() {
    let pdf = Document::load_mem(&render_invoice(&invoice()).unwrap()).unwrap();
    let info = pdf.trailer.get(b"Info").and_then(Object::as_reference).unwrap();
    let title = pdf.get_dictionary(info).unwrap().get(b"Title").unwrap();
    assert_eq!(title.as_str().unwrap(), b"Invoice #42");
}

#[test]
fn unencodable_field_fails_without_output() {
    let mut data = invoice();
    data.client.name = "Łukasz".into();
    match render_invoice(&data) {
        Err(RenderError::Pdf(PdfError::Unencodable { ch, .. })) => assert_eq!(ch, 'Ł'),
        other => panic!("expected an encoding error, got {:?}", other.map(|b| b.len())),
    }
}

#[test]
fn embedded_fonts_accept_any_script() {
    let mut data = invoice();
    data.client.name = "Łukasz Żółć".into();
    let options = LayoutOptions {
        fonts: FontChoice::Embedded {
            regular: DEJAVU_SANS.to_vec(),
            bold: DEJAVU_SANS_BOLD.to_vec(),
        },
        compress: true,
    };
    let bytes = render_invoice_with(&data, &options).unwrap();
    let pdf = Document::load_mem(&bytes).unwrap();
    assert_eq!(pdf.get_pages().len(), 1);
    assert_eq!(bytes, render_invoice_with(&data, &options).unwrap());
}

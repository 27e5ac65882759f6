//! Output is checked with an independent parser.

use invoice_pdf::{BuiltinFont, Color, PdfDocument, TextStyle};
use lopdf::content::Content;
use lopdf::{Document, Object};

fn sample(compress: bool) -> Vec<u8> {
    let mut doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    doc.set_compression(compress);
    doc.set_info("Title", "Parser check");
    doc.begin_page(595.0, 842.0).unwrap();
    doc.set_fill_color(Color::gray(0.95)).unwrap();
    doc.rect(50.0, 500.0, 495.0, 25.0).unwrap().fill().unwrap();
    doc.set_fill_color(Color::gray(0.2)).unwrap();
    doc.place_text_styled("IBAN: DE00 1234", 50.0, 300.0, &TextStyle::new(BuiltinFont::HelveticaBold, 12.0))
        .unwrap();
    doc.end_document().unwrap()
}

fn shown_strings(bytes: &[u8]) -> Vec<Vec<u8>> {
    let pdf = Document::load_mem(bytes).expect("lopdf should open the document");
    let pages = pdf.get_pages();
    assert_eq!(pages.len(), 1);
    let page_id = *pages.values().next().unwrap();
    let content = Content::decode(&pdf.get_page_content(page_id).unwrap()).unwrap();
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| match op.operands.first() {
            Some(Object::String(bytes, _)) => Some(bytes.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn uncompressed_document_parses() {
    assert_eq!(shown_strings(&sample(false)), vec![b"IBAN: DE00 1234".to_vec()]);
}

#[test]
fn compressed_document_parses() {
    assert_eq!(shown_strings(&sample(true)), vec![b"IBAN: DE00 1234".to_vec()]);
}

#[test]
fn trailer_info_is_readable() {
    let pdf = Document::load_mem(&sample(false)).unwrap();
    let info = pdf.trailer.get(b"Info").and_then(Object::as_reference).unwrap();
    let title = pdf.get_dictionary(info).unwrap().get(b"Title").unwrap();
    assert_eq!(title.as_str().unwrap(), b"Parser check");
}

use invoice_pdf::{BuiltinFont, Color, PdfDocument, TextStyle};

fn page_output(draw: impl FnOnce(&mut PdfDocument<Vec<u8>>)) -> String {
    let mut doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    doc.begin_page(595.0, 842.0).unwrap();
    draw(&mut doc);
    let bytes = doc.end_document().unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[test]
fn stroke_line_produces_operators() {
    let output = page_output(|doc| {
        doc.move_to(50.0, 300.0).unwrap().line_to(545.0, 300.0).unwrap().stroke().unwrap();
    });
    assert!(output.contains("50 300 m\n545 300 l\nS\n"));
}

#[test]
fn filled_rectangle_operators() {
    let output = page_output(|doc| {
        doc.set_fill_color(Color::gray(0.95)).unwrap();
        doc.rect(50.0, 512.5, 495.0, 25.0).unwrap().fill().unwrap();
    });
    assert!(output.contains("0.95 0.95 0.95 rg\n50 512.5 495 25 re\nf\n"));
}

#[test]
fn stroke_color_and_width() {
    let output = page_output(|doc| {
        doc.set_stroke_color(Color::rgb(1.0, 0.0, 0.0)).unwrap();
        doc.set_line_width(2.5).unwrap();
    });
    assert!(output.contains("1 0 0 RG\n"));
    assert!(output.contains("2.5 w\n"));
}

#[test]
fn save_restore_wraps_colored_text() {
    let output = page_output(|doc| {
        doc.save_state().unwrap();
        doc.set_fill_color(Color::gray(0.4)).unwrap();
        doc.place_text_styled("Date:", 50.0, 757.0, &TextStyle::new(BuiltinFont::HelveticaBold, 10.0))
            .unwrap();
        doc.restore_state().unwrap();
    });
    let q = output.find("q\n").unwrap();
    let text = output.find("(Date:) Tj").unwrap();
    let big_q = output.find("Q\n").unwrap();
    assert!(q < text && text < big_q);
}

#[test]
fn measure_text_uses_builtin_metrics() {
    let doc = PdfDocument::new(Vec::<u8>::new()).unwrap();
    let regular = doc.measure_text("Service", &TextStyle::new(BuiltinFont::Helvetica, 10.0)).unwrap();
    let bold = doc.measure_text("Service", &TextStyle::new(BuiltinFont::HelveticaBold, 10.0)).unwrap();
    assert!(regular > 0.0);
    assert!(bold > regular);
}

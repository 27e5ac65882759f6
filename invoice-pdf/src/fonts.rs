use crate::error::PdfError;

/// Index into the document's embedded TrueType font list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrueTypeFontId(pub usize);

/// Unified font reference: a standard PDF font or an embedded
/// TrueType font loaded into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontRef {
    Builtin(BuiltinFont),
    TrueType(TrueTypeFontId),
}

impl From<BuiltinFont> for FontRef {
    fn from(font: BuiltinFont) -> Self {
        FontRef::Builtin(font)
    }
}

/// The regular/bold pair of the standard Helvetica family.
///
/// These are part of the standard 14 fonts every conforming viewer
/// ships, so referencing them keeps a document self-contained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
}

impl BuiltinFont {
    pub const ALL: [BuiltinFont; 2] = [BuiltinFont::Helvetica, BuiltinFont::HelveticaBold];

    /// Resource name used in content streams.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "F1",
            BuiltinFont::HelveticaBold => "F2",
        }
    }

    /// The /BaseFont name.
    pub fn pdf_base_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Encode `text` as WinAnsiEncoding bytes for a literal string.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, PdfError> {
        text.chars()
            .map(|ch| {
                win_ansi_code(ch).ok_or_else(|| PdfError::Unencodable {
                    ch,
                    font: self.pdf_base_name().to_string(),
                })
            })
            .collect()
    }
}

/// Text styling options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: FontRef,
    pub font_size: f64,
}

impl TextStyle {
    pub fn new(font: impl Into<FontRef>, font_size: f64) -> Self {
        TextStyle {
            font: font.into(),
            font_size,
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle::new(BuiltinFont::Helvetica, 12.0)
    }
}

/// Map a character to its WinAnsiEncoding code (PDF 32000-1 Annex D).
pub fn win_ansi_code(ch: char) -> Option<u8> {
    let code = ch as u32;
    match code {
        0x20..=0x7e | 0xa0..=0xff => Some(code as u8),
        _ => {
            let mapped = match ch {
                '€' => 0x80,
                '‚' => 0x82,
                'ƒ' => 0x83,
                '„' => 0x84,
                '…' => 0x85,
                '†' => 0x86,
                '‡' => 0x87,
                'ˆ' => 0x88,
                '‰' => 0x89,
                'Š' => 0x8a,
                '‹' => 0x8b,
                'Œ' => 0x8c,
                'Ž' => 0x8e,
                '‘' => 0x91,
                '’' => 0x92,
                '“' => 0x93,
                '”' => 0x94,
                '•' => 0x95,
                '–' => 0x96,
                '—' => 0x97,
                '˜' => 0x98,
                '™' => 0x99,
                'š' => 0x9a,
                '›' => 0x9b,
                'œ' => 0x9c,
                'ž' => 0x9e,
                'Ÿ' => 0x9f,
                _ => return None,
            };
            Some(mapped)
        }
    }
}

/// Helvetica advance widths for ASCII 32..=126, 1/1000 em (Adobe AFM).
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584,
    278, 333, 278, 278, 556, 556, 556, 556, 556, 556, 556, 556,
    556, 556, 278, 278, 584, 584, 584, 556, 1015, 667, 667, 722,
    722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278,
    278, 278, 469, 556, 333, 556, 556, 500, 556, 556, 278, 556,
    556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333, 500,
    278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths for ASCII 32..=126, 1/1000 em.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584,
    278, 333, 278, 278, 556, 556, 556, 556, 556, 556, 556, 556,
    556, 556, 333, 333, 584, 584, 584, 611, 975, 722, 722, 722,
    722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333,
    278, 333, 584, 556, 333, 556, 611, 556, 611, 556, 333, 611,
    611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389, 556,
    333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width used for characters outside the ASCII tables.
const DEFAULT_WIDTH: u16 = 556;

/// Font metrics for the builtin fonts.
pub struct FontMetrics;

impl FontMetrics {
    /// Width of a character in 1/1000 em units.
    pub fn char_width(font: BuiltinFont, ch: char) -> u16 {
        let code = ch as u32;
        if !(32..=126).contains(&code) {
            return DEFAULT_WIDTH;
        }
        let index = (code - 32) as usize;
        match font {
            BuiltinFont::Helvetica => HELVETICA_WIDTHS[index],
            BuiltinFont::HelveticaBold => HELVETICA_BOLD_WIDTHS[index],
        }
    }

    /// Width of a text string in points.
    pub fn measure_text(text: &str, font: BuiltinFont, font_size: f64) -> f64 {
        let total: u32 = text.chars().map(|ch| Self::char_width(font, ch) as u32).sum();
        total as f64 * font_size / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_names_are_stable() {
        assert_eq!(BuiltinFont::Helvetica.pdf_name(), "F1");
        assert_eq!(BuiltinFont::HelveticaBold.pdf_name(), "F2");
        assert_eq!(BuiltinFont::HelveticaBold.pdf_base_name(), "Helvetica-Bold");
    }

    #[test]
    fn bold_is_wider_than_regular() {
        let regular = FontMetrics::measure_text("Invoice", BuiltinFont::Helvetica, 10.0);
        let bold = FontMetrics::measure_text("Invoice", BuiltinFont::HelveticaBold, 10.0);
        assert!(bold > regular);
    }

    #[test]
    fn measure_known_width() {
        // "A" = 667 units at 12pt.
        let w = FontMetrics::measure_text("A", BuiltinFont::Helvetica, 12.0);
        assert!((w - 8.004).abs() < 1e-9);
    }

    #[test]
    fn win_ansi_covers_latin1_and_specials() {
        assert_eq!(win_ansi_code('A'), Some(b'A'));
        assert_eq!(win_ansi_code('é'), Some(0xe9));
        assert_eq!(win_ansi_code('€'), Some(0x80));
        assert_eq!(win_ansi_code('—'), Some(0x97));
        assert_eq!(win_ansi_code('\u{7f}'), None);
        assert_eq!(win_ansi_code('\t'), None);
        assert_eq!(win_ansi_code('ł'), None);
    }

    #[test]
    fn encode_rejects_characters_outside_win_ansi() {
        assert_eq!(BuiltinFont::Helvetica.encode("£300").unwrap(), vec![0xa3, b'3', b'0', b'0']);
        match BuiltinFont::Helvetica.encode("Łódź") {
            Err(PdfError::Unencodable { ch, font }) => {
                assert_eq!(ch, 'Ł');
                assert_eq!(font, "Helvetica");
            }
            other => panic!("expected Unencodable, got {:?}", other),
        }
    }
}

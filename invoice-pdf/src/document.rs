use std::io::{self, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::PdfError;
use crate::fonts::{BuiltinFont, FontMetrics, FontRef, TextStyle, TrueTypeFontId};
use crate::graphics::Color;
use crate::objects::{ObjId, PdfObject};
use crate::truetype::{FontObjIds, TrueTypeFont};
use crate::writer::{escape_pdf_bytes, PdfWriter};

const CATALOG_OBJ: ObjId = ObjId(1, 0);
const PAGES_OBJ: ObjId = ObjId(2, 0);
const FONT_HELV_OBJ: ObjId = ObjId(3, 0);
const FONT_HELV_BOLD_OBJ: ObjId = ObjId(4, 0);
const FIRST_FREE_OBJ_NUM: u32 = 5;

/// High-level API for building PDF documents.
///
/// Generic over `Write` so it works with files or in-memory buffers
/// (`Vec<u8>`). Pages are flushed to the writer on `end_page()`.
/// Embedded fonts are written by `end_document()` once every glyph
/// they must describe is known.
///
/// Object numbering is fixed by call order, so the same sequence of
/// calls always yields the same bytes.
pub struct PdfDocument<W: Write> {
    writer: PdfWriter<W>,
    info: Vec<(String, String)>,
    page_obj_ids: Vec<ObjId>,
    current_page: Option<PageBuilder>,
    next_obj_num: u32,
    compress: bool,
    truetype_fonts: Vec<(TrueTypeFont, FontObjIds)>,
}

struct PageBuilder {
    width: f64,
    height: f64,
    content_ops: Vec<u8>,
}

impl<W: Write> PdfDocument<W> {
    /// Create a new PDF document that writes to the given writer.
    /// Writes the header and the two shared Helvetica font objects.
    pub fn new(writer: W) -> Result<Self, PdfError> {
        let mut pdf_writer = PdfWriter::new(writer);
        pdf_writer.write_header()?;

        for (font, id) in BuiltinFont::ALL.iter().zip([FONT_HELV_OBJ, FONT_HELV_BOLD_OBJ]) {
            let dict = PdfObject::dict(vec![
                ("Type", PdfObject::name("Font")),
                ("Subtype", PdfObject::name("Type1")),
                ("BaseFont", PdfObject::name(font.pdf_base_name())),
                ("Encoding", PdfObject::name("WinAnsiEncoding")),
            ]);
            pdf_writer.write_object(id, &dict)?;
        }

        Ok(PdfDocument {
            writer: pdf_writer,
            info: Vec::new(),
            page_obj_ids: Vec::new(),
            current_page: None,
            next_obj_num: FIRST_FREE_OBJ_NUM,
            compress: false,
            truetype_fonts: Vec::new(),
        })
    }

    /// Flate-compress content and font streams written after this call.
    pub fn set_compression(&mut self, enabled: bool) -> &mut Self {
        self.compress = enabled;
        self
    }

    /// Set a document info entry (e.g. "Creator", "Title").
    pub fn set_info(&mut self, key: &str, value: &str) -> &mut Self {
        self.info.push((key.to_string(), value.to_string()));
        self
    }

    fn alloc_obj_id(&mut self) -> ObjId {
        let id = ObjId(self.next_obj_num, 0);
        self.next_obj_num += 1;
        id
    }

    /// Load a TrueType program for embedding. The returned reference can
    /// be used in any `TextStyle` of this document.
    pub fn load_font_bytes(&mut self, data: Vec<u8>) -> Result<FontRef, PdfError> {
        let index = self.truetype_fonts.len();
        let pdf_name = format!("F{}", BuiltinFont::ALL.len() + index + 1);
        let font = TrueTypeFont::from_bytes(data, pdf_name)?;
        let ids = FontObjIds {
            type0: self.alloc_obj_id(),
            cid_font: self.alloc_obj_id(),
            descriptor: self.alloc_obj_id(),
            font_file: self.alloc_obj_id(),
            to_unicode: self.alloc_obj_id(),
        };
        self.truetype_fonts.push((font, ids));
        Ok(FontRef::TrueType(TrueTypeFontId(index)))
    }

    /// Begin a new page with the given dimensions in points.
    /// An open page is closed first.
    pub fn begin_page(&mut self, width: f64, height: f64) -> Result<&mut Self, PdfError> {
        if self.current_page.is_some() {
            self.end_page()?;
        }
        self.current_page = Some(PageBuilder {
            width,
            height,
            content_ops: Vec::new(),
        });
        Ok(self)
    }

    fn push_ops(&mut self, ops: &[u8]) -> Result<&mut Self, PdfError> {
        let page = self.current_page.as_mut().ok_or(PdfError::NoOpenPage)?;
        page.content_ops.extend_from_slice(ops);
        Ok(self)
    }

    /// Width of `text` in points when set in `style`.
    pub fn measure_text(&self, text: &str, style: &TextStyle) -> Result<f64, PdfError> {
        match style.font {
            FontRef::Builtin(font) => Ok(FontMetrics::measure_text(text, font, style.font_size)),
            FontRef::TrueType(TrueTypeFontId(index)) => self
                .truetype_fonts
                .get(index)
                .map(|(font, _)| font.measure_text(text, style.font_size))
                .ok_or(PdfError::UnknownFont),
        }
    }

    /// Place a single line of text with its baseline origin at (x, y).
    /// Coordinates use PDF's default bottom-left origin.
    pub fn place_text_styled(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        style: &TextStyle,
    ) -> Result<&mut Self, PdfError> {
        if self.current_page.is_none() {
            return Err(PdfError::NoOpenPage);
        }
        let (resource, encoded) = match style.font {
            FontRef::Builtin(font) => {
                let mut literal = vec![b'('];
                literal.extend(escape_pdf_bytes(&font.encode(text)?));
                literal.push(b')');
                (font.pdf_name().to_string(), literal)
            }
            FontRef::TrueType(TrueTypeFontId(index)) => {
                let (font, _) = self.truetype_fonts.get_mut(index).ok_or(PdfError::UnknownFont)?;
                (font.pdf_name.clone(), font.encode_text_hex(text).into_bytes())
            }
        };

        let mut ops = format!(
            "BT\n/{} {} Tf\n{} {} Td\n",
            resource,
            format_coord(style.font_size),
            format_coord(x),
            format_coord(y),
        )
        .into_bytes();
        ops.extend_from_slice(&encoded);
        ops.extend_from_slice(b" Tj\nET\n");
        self.push_ops(&ops)
    }

    /// Place text in the default 12pt Helvetica.
    pub fn place_text(&mut self, text: &str, x: f64, y: f64) -> Result<&mut Self, PdfError> {
        self.place_text_styled(text, x, y, &TextStyle::default())
    }

    pub fn set_fill_color(&mut self, color: Color) -> Result<&mut Self, PdfError> {
        self.push_ops(color.fill_op().as_bytes())
    }

    pub fn set_stroke_color(&mut self, color: Color) -> Result<&mut Self, PdfError> {
        self.push_ops(color.stroke_op().as_bytes())
    }

    pub fn set_line_width(&mut self, width: f64) -> Result<&mut Self, PdfError> {
        self.push_ops(format!("{} w\n", format_coord(width)).as_bytes())
    }

    /// Append a rectangle path; (x, y) is the lower-left corner.
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<&mut Self, PdfError> {
        let op = format!(
            "{} {} {} {} re\n",
            format_coord(x),
            format_coord(y),
            format_coord(width),
            format_coord(height),
        );
        self.push_ops(op.as_bytes())
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> Result<&mut Self, PdfError> {
        self.push_ops(format!("{} {} m\n", format_coord(x), format_coord(y)).as_bytes())
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> Result<&mut Self, PdfError> {
        self.push_ops(format!("{} {} l\n", format_coord(x), format_coord(y)).as_bytes())
    }

    pub fn fill(&mut self) -> Result<&mut Self, PdfError> {
        self.push_ops(b"f\n")
    }

    pub fn stroke(&mut self) -> Result<&mut Self, PdfError> {
        self.push_ops(b"S\n")
    }

    pub fn save_state(&mut self) -> Result<&mut Self, PdfError> {
        self.push_ops(b"q\n")
    }

    pub fn restore_state(&mut self) -> Result<&mut Self, PdfError> {
        self.push_ops(b"Q\n")
    }

    fn font_resources(&self) -> PdfObject {
        let mut entries = vec![
            (BuiltinFont::Helvetica.pdf_name(), PdfObject::Reference(FONT_HELV_OBJ)),
            (BuiltinFont::HelveticaBold.pdf_name(), PdfObject::Reference(FONT_HELV_BOLD_OBJ)),
        ];
        for (font, ids) in &self.truetype_fonts {
            entries.push((font.pdf_name.as_str(), PdfObject::Reference(ids.type0)));
        }
        PdfObject::dict(entries)
    }

    /// End the current page: write its content stream and page object.
    pub fn end_page(&mut self) -> Result<(), PdfError> {
        let page = self.current_page.take().ok_or(PdfError::NoOpenPage)?;

        let content_id = self.alloc_obj_id();
        let page_id = self.alloc_obj_id();

        let mut dict = Vec::new();
        let data = maybe_deflate(&mut dict, &page.content_ops, self.compress)?;
        self.writer.write_object(content_id, &PdfObject::stream(dict, data))?;

        let page_dict = PdfObject::dict(vec![
            ("Type", PdfObject::name("Page")),
            ("Parent", PdfObject::Reference(PAGES_OBJ)),
            (
                "MediaBox",
                PdfObject::array(vec![
                    PdfObject::Integer(0),
                    PdfObject::Integer(0),
                    PdfObject::Real(page.width),
                    PdfObject::Real(page.height),
                ]),
            ),
            ("Contents", PdfObject::Reference(content_id)),
            ("Resources", PdfObject::dict(vec![("Font", self.font_resources())])),
        ]);
        self.writer.write_object(page_id, &page_dict)?;

        tracing::debug!(page = self.page_obj_ids.len() + 1, bytes = page.content_ops.len(), "page written");
        self.page_obj_ids.push(page_id);
        Ok(())
    }

    /// Finish the document: embedded fonts, info dictionary, pages tree,
    /// catalog, xref and trailer. Returns the inner writer.
    pub fn end_document(mut self) -> Result<W, PdfError> {
        if self.current_page.is_some() {
            self.end_page()?;
        }

        for (font, ids) in &self.truetype_fonts {
            for (id, obj) in font.pdf_objects(*ids, self.compress)? {
                self.writer.write_object(id, &obj)?;
            }
        }

        let info_id = if self.info.is_empty() {
            None
        } else {
            let id = self.alloc_obj_id();
            let entries = self
                .info
                .iter()
                .map(|(k, v)| (k.as_str(), PdfObject::text_string(v)))
                .collect();
            self.writer.write_object(id, &PdfObject::dict(entries))?;
            Some(id)
        };

        let kids = self.page_obj_ids.iter().map(|id| PdfObject::Reference(*id)).collect();
        let pages = PdfObject::dict(vec![
            ("Type", PdfObject::name("Pages")),
            ("Kids", PdfObject::Array(kids)),
            ("Count", PdfObject::Integer(self.page_obj_ids.len() as i64)),
        ]);
        self.writer.write_object(PAGES_OBJ, &pages)?;

        let catalog = PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::Reference(PAGES_OBJ)),
        ]);
        self.writer.write_object(CATALOG_OBJ, &catalog)?;

        self.writer.write_xref_and_trailer(CATALOG_OBJ, info_id)?;
        Ok(self.writer.into_inner())
    }
}

/// Deflate `data` when `compress` is set, adding /Filter to `dict`.
pub(crate) fn maybe_deflate(dict: &mut Vec<(&str, PdfObject)>, data: &[u8], compress: bool) -> io::Result<Vec<u8>> {
    if !compress {
        return Ok(data.to_vec());
    }
    dict.push(("Filter", PdfObject::name("FlateDecode")));
    deflate(data)
}

fn deflate(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Format a coordinate for content streams: integers without a decimal
/// point, fractions with up to four digits.
pub(crate) fn format_coord(v: f64) -> String {
    if v == v.floor() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        let s = format!("{:.4}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::io;

use crate::error::PdfError;
use crate::objects::{ObjId, PdfObject};

/// Object numbers reserved for one embedded font.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FontObjIds {
    pub type0: ObjId,
    pub cid_font: ObjId,
    pub descriptor: ObjId,
    pub font_file: ObjId,
    pub to_unicode: ObjId,
}

/// A TrueType program parsed for embedding as a Type0/CIDFontType2 font.
pub struct TrueTypeFont {
    pub(crate) postscript_name: String,
    pub(crate) font_data: Vec<u8>,
    pub(crate) units_per_em: u16,
    pub(crate) ascent: i16,
    pub(crate) descent: i16,
    pub(crate) bbox: [i16; 4],
    pub(crate) cap_height: i16,
    pub(crate) italic_angle: f64,
    pub(crate) flags: u32,
    pub(crate) stem_v: i16,
    /// Unicode codepoint -> glyph ID
    pub(crate) cmap: BTreeMap<u32, u16>,
    /// Glyph ID -> advance width in font units
    pub(crate) glyph_widths: BTreeMap<u16, u16>,
    pub(crate) default_width: u16,
    /// Glyphs referenced by content streams; drives /W and ToUnicode.
    pub(crate) used_glyphs: BTreeSet<u16>,
    /// Glyph ID -> Unicode codepoint
    pub(crate) glyph_to_unicode: BTreeMap<u16, u32>,
    pub(crate) pdf_name: String,
}

impl TrueTypeFont {
    /// Parse a TrueType program from raw .ttf bytes.
    pub fn from_bytes(data: Vec<u8>, pdf_name: String) -> Result<Self, PdfError> {
        let face = ttf_parser::Face::parse(&data, 0).map_err(|e| PdfError::FontParse(e.to_string()))?;

        let units_per_em = face.units_per_em();
        let ascent = face.ascender();
        let bbox = face.global_bounding_box();
        let postscript_name = font_name(&face, ttf_parser::name_id::POST_SCRIPT_NAME)
            .or_else(|| font_name(&face, ttf_parser::name_id::FAMILY).map(|n| n.replace(' ', "")))
            .unwrap_or_else(|| "EmbeddedFont".to_string());

        let mut cmap = BTreeMap::new();
        let mut glyph_to_unicode = BTreeMap::new();
        let subtables = face
            .tables()
            .cmap
            .ok_or_else(|| PdfError::FontParse("font has no cmap table".to_string()))?
            .subtables;
        for subtable in subtables.into_iter().filter(|s| s.is_unicode()) {
            subtable.codepoints(|cp| {
                if let Some(gid) = subtable.glyph_index(cp) {
                    cmap.insert(cp, gid.0);
                    glyph_to_unicode.entry(gid.0).or_insert(cp);
                }
            });
        }

        let glyph_widths: BTreeMap<u16, u16> = (0..face.number_of_glyphs())
            .map(|gid| (gid, face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0)))
            .collect();
        let default_width = glyph_widths.get(&0).copied().unwrap_or(0);

        tracing::debug!(font = %postscript_name, glyphs = glyph_widths.len(), "parsed TrueType font");

        Ok(TrueTypeFont {
            postscript_name,
            units_per_em,
            ascent,
            descent: face.descender(),
            bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            cap_height: face.capital_height().unwrap_or(ascent),
            italic_angle: face.italic_angle() as f64,
            flags: compute_flags(&face),
            stem_v: estimate_stem_v(&face),
            cmap,
            glyph_widths,
            default_width,
            used_glyphs: BTreeSet::new(),
            glyph_to_unicode,
            pdf_name,
            font_data: data,
        })
    }

    fn to_pdf_units(&self, value: i64) -> i64 {
        value * 1000 / self.units_per_em as i64
    }

    fn glyph_width_pdf(&self, gid: u16) -> i64 {
        let raw = self.glyph_widths.get(&gid).copied().unwrap_or(self.default_width);
        self.to_pdf_units(raw as i64)
    }

    /// Width of a text string in points.
    pub fn measure_text(&self, text: &str, font_size: f64) -> f64 {
        let total: i64 = text
            .chars()
            .map(|ch| self.glyph_width_pdf(self.cmap.get(&(ch as u32)).copied().unwrap_or(0)))
            .sum();
        total as f64 * font_size / 1000.0
    }

    /// Encode text as hex glyph IDs (`<0048...>`) and record the glyphs
    /// as used. Characters without a glyph map to .notdef.
    pub fn encode_text_hex(&mut self, text: &str) -> String {
        let mut hex = String::with_capacity(text.len() * 4 + 2);
        hex.push('<');
        for ch in text.chars() {
            let gid = self.cmap.get(&(ch as u32)).copied().unwrap_or(0);
            self.used_glyphs.insert(gid);
            hex.push_str(&format!("{:04X}", gid));
        }
        hex.push('>');
        hex
    }

    /// The /W array for used glyphs: `[cid [w1 w2 ...] ...]`, grouping
    /// runs of consecutive glyph IDs.
    pub(crate) fn build_w_array(&self) -> Vec<PdfObject> {
        let glyphs: Vec<u16> = self.used_glyphs.iter().copied().collect();
        let mut result = Vec::new();
        let mut i = 0;
        while i < glyphs.len() {
            let start = glyphs[i];
            let mut widths = Vec::new();
            let mut j = i;
            while j < glyphs.len() && glyphs[j] as usize == start as usize + (j - i) {
                widths.push(PdfObject::Integer(self.glyph_width_pdf(glyphs[j])));
                j += 1;
            }
            result.push(PdfObject::Integer(start as i64));
            result.push(PdfObject::Array(widths));
            i = j;
        }
        result
    }

    /// ToUnicode CMap program so viewers can extract text.
    pub(crate) fn build_tounicode_cmap(&self) -> Vec<u8> {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n\
             <0000> <FFFF>\n\
             endcodespacerange\n",
        );

        let mappings: Vec<(u16, u32)> = self
            .used_glyphs
            .iter()
            .filter_map(|gid| self.glyph_to_unicode.get(gid).map(|&cp| (*gid, cp)))
            .collect();
        // At most 100 entries per beginbfchar block.
        for chunk in mappings.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for &(gid, cp) in chunk {
                let utf16: String = char::from_u32(cp)
                    .map(|c| c.encode_utf16(&mut [0; 2]).iter().map(|u| format!("{:04X}", u)).collect())
                    .unwrap_or_else(|| "FFFD".to_string());
                cmap.push_str(&format!("<{:04X}> <{}>\n", gid, utf16));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str(
            "endcmap\n\
             CMapName currentdict /CMap defineresource pop\n\
             end\n\
             end\n",
        );
        cmap.into_bytes()
    }

    /// Build the five objects that make up the embedded font.
    pub(crate) fn pdf_objects(&self, ids: FontObjIds, compress: bool) -> io::Result<Vec<(ObjId, PdfObject)>> {
        let name = PdfObject::name(&self.postscript_name);

        let type0 = PdfObject::dict(vec![
            ("Type", PdfObject::name("Font")),
            ("Subtype", PdfObject::name("Type0")),
            ("BaseFont", name.clone()),
            ("Encoding", PdfObject::name("Identity-H")),
            ("DescendantFonts", PdfObject::array(vec![PdfObject::Reference(ids.cid_font)])),
            ("ToUnicode", PdfObject::Reference(ids.to_unicode)),
        ]);

        let cid_font = PdfObject::dict(vec![
            ("Type", PdfObject::name("Font")),
            ("Subtype", PdfObject::name("CIDFontType2")),
            ("BaseFont", name.clone()),
            (
                "CIDSystemInfo",
                PdfObject::dict(vec![
                    ("Registry", PdfObject::literal_string("Adobe")),
                    ("Ordering", PdfObject::literal_string("Identity")),
                    ("Supplement", PdfObject::Integer(0)),
                ]),
            ),
            ("FontDescriptor", PdfObject::Reference(ids.descriptor)),
            ("DW", PdfObject::Integer(self.to_pdf_units(self.default_width as i64))),
            ("W", PdfObject::Array(self.build_w_array())),
            ("CIDToGIDMap", PdfObject::name("Identity")),
        ]);

        let bbox = self
            .bbox
            .iter()
            .map(|&v| PdfObject::Integer(self.to_pdf_units(v as i64)))
            .collect();
        let descriptor = PdfObject::dict(vec![
            ("Type", PdfObject::name("FontDescriptor")),
            ("FontName", name),
            ("Flags", PdfObject::Integer(self.flags as i64)),
            ("FontBBox", PdfObject::Array(bbox)),
            ("ItalicAngle", PdfObject::Real(self.italic_angle)),
            ("Ascent", PdfObject::Integer(self.to_pdf_units(self.ascent as i64))),
            ("Descent", PdfObject::Integer(self.to_pdf_units(self.descent as i64))),
            ("CapHeight", PdfObject::Integer(self.to_pdf_units(self.cap_height as i64))),
            ("StemV", PdfObject::Integer(self.stem_v as i64)),
            ("FontFile2", PdfObject::Reference(ids.font_file)),
        ]);

        let mut font_file_dict = vec![("Length1", PdfObject::Integer(self.font_data.len() as i64))];
        let font_file_data = crate::document::maybe_deflate(&mut font_file_dict, &self.font_data, compress)?;
        let font_file = PdfObject::stream(font_file_dict, font_file_data);

        let mut tounicode_dict = Vec::new();
        let tounicode_data = crate::document::maybe_deflate(&mut tounicode_dict, &self.build_tounicode_cmap(), compress)?;
        let to_unicode = PdfObject::stream(tounicode_dict, tounicode_data);

        Ok(vec![
            (ids.type0, type0),
            (ids.cid_font, cid_font),
            (ids.descriptor, descriptor),
            (ids.font_file, font_file),
            (ids.to_unicode, to_unicode),
        ])
    }
}

fn font_name(face: &ttf_parser::Face, id: u16) -> Option<String> {
    face.names()
        .into_iter()
        .find(|name| name.name_id == id && name.is_unicode())
        .and_then(|name| name.to_string())
}

/// PDF font descriptor flags (PDF 32000-1 Table 123).
fn compute_flags(face: &ttf_parser::Face) -> u32 {
    // Nonsymbolic: Latin text fonts.
    let mut flags = 32;
    if face.is_monospaced() {
        flags |= 1;
    }
    if face.is_italic() {
        flags |= 64;
    }
    flags
}

/// Rough StemV from the weight class: 10 + 220 * (weight/1000)^2.
fn estimate_stem_v(face: &ttf_parser::Face) -> i16 {
    let w = face.weight().to_number() as f64 / 1000.0;
    (10.0 + 220.0 * w * w) as i16
}

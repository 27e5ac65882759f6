use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::objects::{ObjId, PdfObject};

/// Low-level PDF binary writer. Serializes PDF objects to any
/// `Write` target while tracking byte offsets for the xref table.
pub struct PdfWriter<W: Write> {
    writer: W,
    offset: usize,
    xref: BTreeMap<u32, usize>,
}

impl<W: Write> PdfWriter<W> {
    pub fn new(writer: W) -> Self {
        PdfWriter {
            writer,
            offset: 0,
            xref: BTreeMap::new(),
        }
    }

    fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        self.writer.write_all(data)?;
        self.offset += data.len();
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.write_bytes(s.as_bytes())
    }

    /// Write the PDF 1.7 header followed by a binary marker comment.
    pub fn write_header(&mut self) -> io::Result<()> {
        self.write_str("%PDF-1.7\n")?;
        self.write_bytes(b"%\xe2\xe3\xcf\xd3\n")
    }

    /// Write an indirect object, recording its byte offset for xref.
    pub fn write_object(&mut self, id: ObjId, obj: &PdfObject) -> io::Result<()> {
        self.xref.insert(id.0, self.offset);
        self.write_str(&format!("{} {} obj\n", id.0, id.1))?;
        self.write_pdf_object(obj)?;
        self.write_str("\nendobj\n")
    }

    fn write_dict_entries(&mut self, entries: &[(String, PdfObject)]) -> io::Result<()> {
        for (key, val) in entries {
            self.write_str(" /")?;
            self.write_str(key)?;
            self.write_str(" ")?;
            self.write_pdf_object(val)?;
        }
        Ok(())
    }

    fn write_pdf_object(&mut self, obj: &PdfObject) -> io::Result<()> {
        match obj {
            PdfObject::Null => self.write_str("null"),
            PdfObject::Boolean(b) => self.write_str(if *b { "true" } else { "false" }),
            PdfObject::Integer(n) => self.write_str(&n.to_string()),
            PdfObject::Real(f) => self.write_str(&format_real(*f)),
            PdfObject::Name(name) => {
                self.write_str("/")?;
                self.write_str(name)
            }
            PdfObject::LiteralString(bytes) => {
                self.write_str("(")?;
                self.write_bytes(&escape_pdf_bytes(bytes))?;
                self.write_str(")")
            }
            PdfObject::HexString(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
                self.write_str(&format!("<{}>", hex))
            }
            PdfObject::Array(items) => {
                self.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.write_str(" ")?;
                    }
                    self.write_pdf_object(item)?;
                }
                self.write_str("]")
            }
            PdfObject::Dictionary(entries) => {
                self.write_str("<<")?;
                self.write_dict_entries(entries)?;
                self.write_str(" >>")
            }
            PdfObject::Stream { dict, data } => {
                self.write_str("<<")?;
                self.write_dict_entries(dict)?;
                self.write_str(&format!(" /Length {} >>\nstream\n", data.len()))?;
                self.write_bytes(data)?;
                self.write_str("\nendstream")
            }
            PdfObject::Reference(id) => self.write_str(&format!("{} {} R", id.0, id.1)),
        }
    }

    /// Write xref table, trailer, startxref and %%EOF.
    pub fn write_xref_and_trailer(&mut self, root_id: ObjId, info_id: Option<ObjId>) -> io::Result<()> {
        let xref_offset = self.offset;
        let size = self.xref.keys().next_back().map(|&n| n + 1).unwrap_or(1);

        self.write_str(&format!("xref\n0 {}\n", size))?;
        // Each entry is exactly 20 bytes including the CRLF.
        self.write_bytes(b"0000000000 65535 f\r\n")?;
        for obj_num in 1..size {
            let entry = match self.xref.get(&obj_num) {
                Some(&off) => format!("{:010} 00000 n\r\n", off),
                None => "0000000000 00000 f\r\n".to_string(),
            };
            self.write_str(&entry)?;
        }

        self.write_str(&format!(
            "trailer\n<< /Size {} /Root {} {} R",
            size, root_id.0, root_id.1,
        ))?;
        if let Some(info) = info_id {
            self.write_str(&format!(" /Info {} {} R", info.0, info.1))?;
        }
        self.write_str(" >>\n")?;
        self.write_str(&format!("startxref\n{}\n%%EOF\n", xref_offset))
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Escape the bytes of a PDF literal string.
pub fn escape_pdf_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'(' => out.extend_from_slice(b"\\("),
            b')' => out.extend_from_slice(b"\\)"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\n' => out.extend_from_slice(b"\\n"),
            _ => out.push(b),
        }
    }
    out
}

/// Format a float for PDF output: no scientific notation, trailing
/// zeros trimmed, integers keep one decimal.
fn format_real(f: f64) -> String {
    if f == f.floor() && f.abs() < 1e15 {
        format!("{:.1}", f)
    } else {
        let s = format!("{:.6}", f);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize(obj: &PdfObject) -> String {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_object(ObjId(1, 0), obj).unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn header_has_binary_marker() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_header().unwrap();
        assert!(buf.starts_with(b"%PDF-1.7\n%"));
        assert!(buf[10..14].iter().all(|&b| b >= 128));
    }

    #[test]
    fn dictionary_and_references() {
        let out = serialize(&PdfObject::dict(vec![
            ("Type", PdfObject::name("Catalog")),
            ("Pages", PdfObject::Reference(ObjId(2, 0))),
        ]));
        assert!(out.starts_with("1 0 obj\n"));
        assert!(out.contains("<< /Type /Catalog /Pages 2 0 R >>"));
        assert!(out.ends_with("\nendobj\n"));
    }

    #[test]
    fn stream_reports_length() {
        let out = serialize(&PdfObject::stream(vec![], b"BT ET".to_vec()));
        assert!(out.contains("<< /Length 5 >>\nstream\nBT ET\nendstream"));
    }

    #[test]
    fn hex_string_is_uppercase() {
        let out = serialize(&PdfObject::HexString(vec![0xfe, 0xff, 0x00, 0x41]));
        assert!(out.contains("<FEFF0041>"));
    }

    #[test]
    fn literal_string_is_escaped() {
        let out = serialize(&PdfObject::literal_string("a(b)c\\d"));
        assert!(out.contains("(a\\(b\\)c\\\\d)"));
        assert_eq!(escape_pdf_bytes(b"x\ny"), b"x\\ny".to_vec());
    }

    #[test]
    fn xref_entries_are_twenty_bytes() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_header().unwrap();
        w.write_object(ObjId(1, 0), &PdfObject::name("Catalog")).unwrap();
        w.write_xref_and_trailer(ObjId(1, 0), None).unwrap();

        let marker = b"xref\n0 2\n";
        let start = buf.windows(marker.len()).position(|w| w == marker).unwrap() + marker.len();
        assert_eq!(&buf[start + 18..start + 20], b"\r\n");
        assert_eq!(&buf[start + 38..start + 40], b"\r\n");
    }

    #[test]
    fn gaps_in_numbering_become_free_entries() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_header().unwrap();
        w.write_object(ObjId(1, 0), &PdfObject::Null).unwrap();
        w.write_object(ObjId(3, 0), &PdfObject::Null).unwrap();
        w.write_xref_and_trailer(ObjId(1, 0), None).unwrap();
        let out = String::from_utf8_lossy(&buf);
        assert!(out.contains("xref\n0 4\n"));
        assert!(out.contains("0000000000 00000 f\r\n"));
        assert!(out.contains("/Size 4"));
    }

    #[test]
    fn trailer_references_root_and_info() {
        let mut buf = Vec::new();
        let mut w = PdfWriter::new(&mut buf);
        w.write_header().unwrap();
        w.write_object(ObjId(1, 0), &PdfObject::Null).unwrap();
        w.write_object(ObjId(2, 0), &PdfObject::Null).unwrap();
        w.write_xref_and_trailer(ObjId(1, 0), Some(ObjId(2, 0))).unwrap();
        let out = String::from_utf8_lossy(&buf);
        assert!(out.contains("/Root 1 0 R /Info 2 0 R"));
        assert!(out.ends_with("%%EOF\n"));
    }

    #[test]
    fn format_real_values() {
        assert_eq!(format_real(595.0), "595.0");
        assert_eq!(format_real(12.5), "12.5");
        assert_eq!(format_real(0.333333333), "0.333333");
    }
}

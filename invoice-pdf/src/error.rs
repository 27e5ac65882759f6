use std::io;

use thiserror::Error;

/// Errors raised while building or serializing a PDF document.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("I/O error while writing PDF: {0}")]
    Io(#[from] io::Error),

    /// A drawing operation was issued with no page open.
    #[error("no page is open")]
    NoOpenPage,

    /// The character has no code in the font's encoding.
    #[error("font {font} cannot encode {ch:?}")]
    Unencodable { ch: char, font: String },

    #[error("failed to parse TrueType font: {0}")]
    FontParse(String),

    /// A `FontRef` that was not produced by this document.
    #[error("unknown font reference")]
    UnknownFont,
}

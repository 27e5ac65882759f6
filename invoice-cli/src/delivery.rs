use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Write the finished PDF into `dir`, creating the directory if needed.
/// An existing file with the same name is replaced.
pub fn write_invoice(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(file_name);
    fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "invoice written");
    Ok(path)
}

/// Open the file in the default viewer. Failures are logged, not returned.
pub fn open(path: &Path) {
    if let Err(err) = opener::open(path) {
        tracing::warn!(path = %path.display(), error = %err, "could not open invoice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_directories() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested");
        let path = write_invoice(&dir, "Invoice-1-Acme.pdf", b"%PDF-1.7").unwrap();
        assert_eq!(path, dir.join("Invoice-1-Acme.pdf"));
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.7");
    }
}

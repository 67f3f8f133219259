//! Raw text extraction from source files.
//!
//! Format-specific parsing lives behind [`TextExtractor`]; the pipeline
//! never knows which formats exist. The stock [`FileExtractor`] reads
//! plain text and markdown with a lossy UTF-8 fallback for files that are
//! not valid UTF-8.

use std::fs;
use std::path::{Path, PathBuf};

use ragdb_core::error::{Error, Result};

pub trait TextExtractor: Send + Sync {
    /// Extract the raw text of one source file.
    fn extract_text(&self, path: &Path) -> Result<String>;

    /// File extensions (without dots) this extractor accepts.
    fn supported_formats(&self) -> &[&str];
}

#[derive(Default)]
pub struct FileExtractor;

impl FileExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for FileExtractor {
    fn extract_text(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_lowercase();
        match ext.as_str() {
            "txt" | "md" => read_lossy(path),
            other => Err(Error::UnsupportedFormat(format!(".{other}"))),
        }
    }

    fn supported_formats(&self) -> &[&str] {
        &["txt", "md"]
    }
}

fn read_lossy(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(_) => {
            let bytes = fs::read(path).map_err(|e| Error::Extraction {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?;
            Ok(String::from_utf8_lossy(&bytes).to_string())
        }
    }
}

/// Walk `root` and collect every supported source file, sorted for a
/// deterministic indexing order.
pub fn discover_sources(root: &Path, extractor: &dyn TextExtractor) -> Vec<PathBuf> {
    let mut sources: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .map(str::to_lowercase)
                .is_some_and(|ext| extractor.supported_formats().contains(&ext.as_str()))
        })
        .collect();
    sources.sort();
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_extension_is_reported_as_such() {
        let tmp = tempfile::tempdir().expect("tmp");
        let path = tmp.path().join("binary.xyz");
        fs::write(&path, b"data").expect("write");
        let err = FileExtractor::new().extract_text(&path).expect_err("should fail");
        assert!(matches!(err, Error::UnsupportedFormat(ref ext) if ext == ".xyz"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = FileExtractor::new()
            .extract_text(Path::new("/no/such/file.txt"))
            .expect_err("should fail");
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn invalid_utf8_falls_back_to_lossy_read() {
        let tmp = tempfile::tempdir().expect("tmp");
        let path = tmp.path().join("weird.txt");
        fs::write(&path, [b'h', b'i', 0xFF, b'!']).expect("write");
        let text = FileExtractor::new().extract_text(&path).expect("extract");
        assert!(text.starts_with("hi"));
        assert!(text.ends_with('!'));
    }
}

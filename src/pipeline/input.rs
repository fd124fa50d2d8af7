//! Upload classification: decide what kind of document a path holds.
//!
//! Classification is purely by file extension, case-insensitive, exactly as
//! the upload surface gates it. Content sniffing is left to the rasteriser
//! (pdfium rejects non-PDFs) and to the model (which sees the image bytes).

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Extensions accepted as direct image input.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Every extension the upload surface accepts.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "bmp", "gif"];

/// The inferred kind of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Image,
    Unsupported,
}

impl FileKind {
    /// Classify a path by its extension.
    pub fn classify(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("pdf") => FileKind::Pdf,
            Some(e) if IMAGE_EXTENSIONS.contains(&e) => FileKind::Image,
            _ => FileKind::Unsupported,
        }
    }
}

/// A file handed over by the upload surface, with its classified kind.
///
/// Lives for one upload event only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub kind: FileKind,
}

impl UploadedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = FileKind::classify(&path);
        Self { path, kind }
    }

    /// File name for user-facing messages; falls back to the full path.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_extension() {
        assert_eq!(FileKind::classify(Path::new("scan.pdf")), FileKind::Pdf);
        assert_eq!(FileKind::classify(Path::new("ID.PDF")), FileKind::Pdf);
        for name in ["a.png", "a.jpg", "a.JPEG", "a.bmp", "a.gif"] {
            assert_eq!(FileKind::classify(Path::new(name)), FileKind::Image, "{name}");
        }
        assert_eq!(FileKind::classify(Path::new("notes.txt")), FileKind::Unsupported);
        assert_eq!(FileKind::classify(Path::new("no_extension")), FileKind::Unsupported);
        assert_eq!(FileKind::classify(Path::new("archive.pdf.zip")), FileKind::Unsupported);
    }

    #[test]
    fn supported_list_covers_every_image_extension() {
        for ext in IMAGE_EXTENSIONS {
            assert!(SUPPORTED_EXTENSIONS.contains(ext));
        }
    }

    #[test]
    fn display_name_is_file_name() {
        let f = UploadedFile::new("/tmp/uploads/passport scan.pdf");
        assert_eq!(f.kind, FileKind::Pdf);
        assert_eq!(f.display_name(), "passport scan.pdf");
    }
}

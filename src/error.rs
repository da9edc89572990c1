//! Error type for the edgequake-pdf2img library.
//!
//! The pipeline is a single linear pass with no partial-failure recovery, so
//! one error type covers every stage. Variants keep the stage that failed
//! (input, PDF, filesystem, ordering, dispatch) so callers can tell a corrupt
//! document from a full disk, while callers that only care about
//! success/failure can keep using `Result::is_ok()`.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-pdf2img library.
#[derive(Debug, Error)]
pub enum Pdf2ImgError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The path has no usable file stem (e.g. `..` or a bare extension).
    #[error("Cannot derive a file stem from '{path}'")]
    InvalidFileName { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// pdfium could not open the document.
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium failed to access or rasterise a page (0-based index).
    #[error("Rasterisation failed for page index {page}: {detail}")]
    PageRenderFailed { page: usize, detail: String },

    // ── Filesystem errors ─────────────────────────────────────────────────
    /// A rasterised page could not be written as PNG.
    #[error("Failed to write page image '{path}': {detail}")]
    ImageWriteFailed { path: PathBuf, detail: String },

    /// An output directory could not be created.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory listing (glob) failed.
    #[error("Failed to list '{pattern}': {detail}")]
    ListFailed { pattern: String, detail: String },

    // ── Ordering errors ───────────────────────────────────────────────────
    /// A file matched `{prefix}_*.png` but its suffix is not a page index.
    ///
    /// Aborts the whole batch: dispatching a partially ordered set would
    /// break the page-order guarantee.
    #[error("Image '{path}' matches prefix '{prefix}' but has no integer page suffix")]
    UnparsablePageSuffix { path: PathBuf, prefix: String },

    // ── Dispatch errors ───────────────────────────────────────────────────
    /// No page images were found after conversion.
    #[error("No image file found for prefix '{prefix}' in '{dir}'")]
    NoImagesFound { dir: PathBuf, prefix: String },

    /// The page renderer reported a failure for one image.
    #[error("Renderer failed on '{path}': {detail}")]
    RendererFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place libpdfium next to the binary or in the working directory.\n\
  • Install pdfium system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2ImgError {
    /// True when the pipeline ran but produced nothing to dispatch.
    ///
    /// The CLI maps every error to exit code 1; library callers use this to
    /// tell "empty document" apart from hard failures.
    pub fn is_no_images(&self) -> bool {
        matches!(self, Pdf2ImgError::NoImagesFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_images_display() {
        let e = Pdf2ImgError::NoImagesFound {
            dir: PathBuf::from("imgs"),
            prefix: "report".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("report"), "got: {msg}");
        assert!(msg.contains("imgs"), "got: {msg}");
        assert!(e.is_no_images());
    }

    #[test]
    fn unparsable_suffix_display() {
        let e = Pdf2ImgError::UnparsablePageSuffix {
            path: PathBuf::from("imgs/doc_final.png"),
            prefix: "doc".into(),
        };
        assert!(e.to_string().contains("doc_final.png"));
        assert!(!e.is_no_images());
    }

    #[test]
    fn page_render_display() {
        let e = Pdf2ImgError::PageRenderFailed {
            page: 3,
            detail: "bitmap alloc".into(),
        };
        assert!(e.to_string().contains("page index 3"));
        assert!(e.to_string().contains("bitmap alloc"));
    }

    #[test]
    fn create_dir_keeps_source() {
        use std::error::Error as _;
        let e = Pdf2ImgError::CreateDirFailed {
            path: PathBuf::from("/ro/imgs"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/ro/imgs"));
    }
}

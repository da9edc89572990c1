//! pdfium library binding.
//!
//! Lookup order (first match wins):
//!
//! 1. `PDFIUM_LIB_PATH`: explicit path to `libpdfium.{so,dylib}` / `pdfium.dll`
//! 2. the platform library name in the current working directory
//! 3. the system library search path
//!
//! A fresh [`Pdfium`] is bound per document. The OS keeps the dynamic
//! library loaded after the first bind.

use crate::error::Pdf2ImgError;
use pdfium_render::prelude::*;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable naming an explicit pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to a pdfium library, trying each location in turn.
pub fn bind_pdfium() -> Result<Pdfium, Pdf2ImgError> {
    if let Some(path) = explicit_library_path() {
        debug!("Binding pdfium from {}", path.display());
        return Pdfium::bind_to_library(&path)
            .map(Pdfium::new)
            .map_err(|e| {
                Pdf2ImgError::PdfiumBindingFailed(format!("{}: {e}", path.display()))
            });
    }

    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
        .map_err(|e| Pdf2ImgError::PdfiumBindingFailed(e.to_string()))
}

fn explicit_library_path() -> Option<PathBuf> {
    std::env::var_os(PDFIUM_LIB_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

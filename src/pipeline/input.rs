//! Input validation: make sure a user-supplied path is a readable PDF.
//!
//! pdfium reports a missing file and a mangled header with the same opaque
//! error code. Checking existence, permissions and the `%PDF` magic bytes up
//! front turns those into distinct [`Pdf2ImgError`] variants before any
//! output directory is touched.

use crate::error::Pdf2ImgError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local PDF path, returning it as an owned `PathBuf`.
pub fn resolve_local(path: impl AsRef<Path>) -> Result<PathBuf, Pdf2ImgError> {
    let path = path.as_ref().to_path_buf();

    if !path.is_file() {
        return Err(Pdf2ImgError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2ImgError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2ImgError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2ImgError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// Create `dir` (and parents) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<(), Pdf2ImgError> {
    std::fs::create_dir_all(dir).map_err(|source| Pdf2ImgError::CreateDirFailed {
        path: dir.to_path_buf(),
        source,
    })
}

//! File discovery and page-order sorting.
//!
//! The image directory is the only channel between rasterisation and
//! dispatch: the rasteriser writes `{stem}_{page}.png`, and dispatch
//! re-discovers those files with `{stem}_*.png` and orders them by the
//! integer suffix. Sorting by the parsed integer rather than the file name
//! keeps `doc_10.png` after `doc_2.png`.

use crate::error::Pdf2ImgError;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extension of rasterised page images.
pub const IMAGE_EXTENSION: &str = "png";

/// File name for page `page_index` of the PDF with stem `stem`.
pub fn page_image_name(stem: &str, page_index: usize) -> String {
    format!("{stem}_{page_index}.{IMAGE_EXTENSION}")
}

/// File name without directory or extension.
pub fn pdf_stem(path: &Path) -> Result<String, Pdf2ImgError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Pdf2ImgError::InvalidFileName {
            path: path.to_path_buf(),
        })
}

/// List `*.pdf` files directly inside `dir`, sorted by path.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>, Pdf2ImgError> {
    glob_files(dir, "*.pdf")
}

/// List `{prefix}_*.png` files directly inside `dir`, in listing order.
///
/// The prefix is escaped, so a stem like `scan[1]` matches literally.
pub fn list_page_images(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, Pdf2ImgError> {
    let name_pattern = format!("{}_*.{IMAGE_EXTENSION}", Pattern::escape(prefix));
    glob_files(dir, &name_pattern)
}

/// Parse the page index from `{prefix}_{index}.png`.
pub fn page_index_of(path: &Path, prefix: &str) -> Result<usize, Pdf2ImgError> {
    let unparsable = || Pdf2ImgError::UnparsablePageSuffix {
        path: path.to_path_buf(),
        prefix: prefix.to_string(),
    };

    let name = path.file_name().and_then(|n| n.to_str()).ok_or_else(unparsable)?;
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix(".png"))
        .and_then(|digits| digits.parse::<usize>().ok())
        .ok_or_else(unparsable)
}

/// Sort page images by their integer suffix, ascending.
///
/// Fails on the first path whose suffix is not an integer; nothing is
/// returned in that case so callers never dispatch a partially ordered set.
pub fn sort_by_page_index(
    paths: Vec<PathBuf>,
    prefix: &str,
) -> Result<Vec<(usize, PathBuf)>, Pdf2ImgError> {
    let mut keyed = paths
        .into_iter()
        .map(|p| page_index_of(&p, prefix).map(|idx| (idx, p)))
        .collect::<Result<Vec<_>, _>>()?;
    keyed.sort();
    Ok(keyed)
}

/// Discover and sort the page images for `prefix` in one step.
pub fn sorted_page_images(
    dir: &Path,
    prefix: &str,
) -> Result<Vec<(usize, PathBuf)>, Pdf2ImgError> {
    let found = list_page_images(dir, prefix)?;
    debug!("Found {} images for '{}' in {}", found.len(), prefix, dir.display());
    sort_by_page_index(found, prefix)
}

/// Expand `{escaped dir}/{name_pattern}`, keeping regular files only.
///
/// `*` does not match a leading dot, so hidden files are never listed.
fn glob_files(dir: &Path, name_pattern: &str) -> Result<Vec<PathBuf>, Pdf2ImgError> {
    let escaped_dir = Pattern::escape(&dir.to_string_lossy());
    let pattern = Path::new(&escaped_dir).join(name_pattern);
    let pattern = pattern.to_string_lossy();

    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..Default::default()
    };
    let entries = glob::glob_with(&pattern, options).map_err(|e| Pdf2ImgError::ListFailed {
        pattern: pattern.to_string(),
        detail: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(path) => debug!("Skipping non-file match {}", path.display()),
            Err(e) => warn!("Skipping unreadable entry under {}: {}", dir.display(), e),
        }
    }
    Ok(files)
}

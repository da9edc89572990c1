//! PDF rasterisation: write every page of a PDF as `{stem}_{page}.png`.
//!
//! pdfium is a blocking C++ library with thread-local state, so the async
//! entry points move the work onto Tokio's blocking pool via
//! `spawn_blocking`. Pages are rendered one after the other; the first
//! failure aborts the document and nothing after it is written.
//!
//! Scale is `dpi / 72` because PDF user space has 72 units per inch. Output
//! for a given document and DPI is deterministic, so re-running overwrites
//! earlier images with identical files.

use crate::error::Pdf2ImgError;
use crate::output::{DocumentMetadata, RasterizedPage};
use crate::pipeline::discover::{page_image_name, pdf_stem};
use crate::pipeline::engine::bind_pdfium;
use image::ImageFormat;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// PDF user-space units per inch.
pub const POINTS_PER_INCH: f32 = 72.0;

/// Scale factor applied to each page for a target DPI.
pub fn scale_factor(dpi: u32) -> f32 {
    dpi as f32 / POINTS_PER_INCH
}

/// Rasterise every page of `pdf_path` into `out_dir`.
///
/// `out_dir` must already exist.
///
/// # Returns
/// One [`RasterizedPage`] per page, in page order.
pub async fn rasterize_pdf(
    pdf_path: &Path,
    out_dir: &Path,
    dpi: u32,
    password: Option<&str>,
) -> Result<Vec<RasterizedPage>, Pdf2ImgError> {
    let path = pdf_path.to_path_buf();
    let dir = out_dir.to_path_buf();
    let pwd = password.map(str::to_owned);

    tokio::task::spawn_blocking(move || rasterize_pdf_blocking(&path, &dir, dpi, pwd.as_deref()))
        .await
        .map_err(|e| Pdf2ImgError::Internal(format!("Rasterise task panicked: {}", e)))?
}

/// Blocking implementation of [`rasterize_pdf`].
pub fn rasterize_pdf_blocking(
    pdf_path: &Path,
    out_dir: &Path,
    dpi: u32,
    password: Option<&str>,
) -> Result<Vec<RasterizedPage>, Pdf2ImgError> {
    let stem = pdf_stem(pdf_path)?;
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, pdf_path, password)?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} ({} pages)", pdf_path.display(), total_pages);

    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale_factor(dpi));
    let mut written = Vec::with_capacity(total_pages);

    for (page_index, page) in pages.iter().enumerate() {
        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            Pdf2ImgError::PageRenderFailed {
                page: page_index,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        let output_path = out_dir.join(page_image_name(&stem, page_index));
        image
            .save_with_format(&output_path, ImageFormat::Png)
            .map_err(|e| Pdf2ImgError::ImageWriteFailed {
                path: output_path.clone(),
                detail: e.to_string(),
            })?;

        debug!(
            "Rendered page {} → {}x{} px",
            page_index,
            image.width(),
            image.height()
        );
        info!("Saved {}", output_path.display());

        written.push(RasterizedPage {
            page_index,
            path: output_path,
            width: image.width(),
            height: image.height(),
        });
    }

    Ok(written)
}

/// Read document metadata without rendering pages.
pub async fn extract_metadata(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2ImgError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(str::to_owned);

    tokio::task::spawn_blocking(move || extract_metadata_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| Pdf2ImgError::Internal(format!("Metadata task panicked: {}", e)))?
}

fn extract_metadata_blocking(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2ImgError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, pdf_path, password)?;

    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata
            .get(tag)
            .map(|t| t.value().to_string())
            .filter(|v| !v.is_empty())
    };

    Ok(DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    })
}

/// Open a document, mapping pdfium's load error onto the password variants.
fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, Pdf2ImgError> {
    pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| classify_load_error(pdf_path.to_path_buf(), format!("{:?}", e), password))
}

fn classify_load_error(path: PathBuf, detail: String, password: Option<&str>) -> Pdf2ImgError {
    if detail.to_lowercase().contains("password") {
        if password.is_some() {
            Pdf2ImgError::WrongPassword { path }
        } else {
            Pdf2ImgError::PasswordRequired { path }
        }
    } else {
        Pdf2ImgError::CorruptPdf { path, detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_factor_tracks_dpi() {
        assert!((scale_factor(72) - 1.0).abs() < f32::EPSILON);
        assert!((scale_factor(150) - 150.0 / 72.0).abs() < f32::EPSILON);
        assert!((scale_factor(36) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn password_errors_are_classified() {
        let p = PathBuf::from("locked.pdf");
        let detail = "PdfiumLibraryInternalError(PasswordError)".to_string();

        assert!(matches!(
            classify_load_error(p.clone(), detail.clone(), None),
            Pdf2ImgError::PasswordRequired { .. }
        ));
        assert!(matches!(
            classify_load_error(p.clone(), detail, Some("nope")),
            Pdf2ImgError::WrongPassword { .. }
        ));
        assert!(matches!(
            classify_load_error(p, "PdfiumLibraryInternalError(FormatError)".into(), None),
            Pdf2ImgError::CorruptPdf { .. }
        ));
    }

    #[tokio::test]
    async fn missing_pdf_is_a_binding_or_load_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = rasterize_pdf(
            &tmp.path().join("missing.pdf"),
            tmp.path(),
            150,
            None,
        )
        .await;
        // Without a pdfium library the bind step fails first.
        assert!(
            matches!(
                result,
                Err(Pdf2ImgError::PdfiumBindingFailed(_)) | Err(Pdf2ImgError::CorruptPdf { .. })
            ),
            "unexpected result: {result:?}"
        );
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}

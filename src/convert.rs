//! End-to-end conversion entry points.
//!
//! ```text
//! validate ──▶ mkdir imgs/ pdf/ ──▶ rasterise ──▶ discover + sort ──▶ dispatch
//! ```
//!
//! Each stage runs to completion before the next starts. The image directory
//! is the hand-off between rasterisation and dispatch, so images left by
//! earlier runs for the same stem are dispatched too.

use crate::config::ConversionConfig;
use crate::error::Pdf2ImgError;
use crate::output::{ConversionReport, DocumentMetadata};
use crate::pipeline::dispatch::{dispatch_directory, DispatchParams, PageRenderer};
use crate::pipeline::{discover, input, rasterize};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Rasterise one PDF and dispatch its pages to `renderer` in page order.
///
/// # Errors
/// - input validation or rasterisation failures (missing, corrupt, locked PDF)
/// - [`Pdf2ImgError::NoImagesFound`] when the document produced no pages
/// - ordering errors from stray files matching `{stem}_*.png`
/// - the first renderer error
pub async fn convert<R: PageRenderer>(
    pdf_path: impl AsRef<Path>,
    renderer: &R,
    config: &ConversionConfig,
) -> Result<ConversionReport, Pdf2ImgError> {
    let pdf_path = input::resolve_local(pdf_path)?;
    let stem = discover::pdf_stem(&pdf_path)?;
    info!("Starting conversion: {}", pdf_path.display());

    input::ensure_dir(&config.pdf_dir)?;
    input::ensure_dir(&config.image_dir)?;

    let render_start = Instant::now();
    let pages = rasterize::rasterize_pdf(
        &pdf_path,
        &config.image_dir,
        config.dpi,
        config.password.as_deref(),
    )
    .await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!("Rasterised {} pages in {}ms", pages.len(), render_duration_ms);

    let params = dispatch_params(config);
    let dispatch_start = Instant::now();
    let dispatched = dispatch_directory(
        renderer,
        &config.image_dir,
        &stem,
        &params,
        config.progress_callback.as_ref(),
    )
    .await?;
    let dispatch_duration_ms = dispatch_start.elapsed().as_millis() as u64;

    info!(
        "Conversion complete: {} images dispatched in {}ms",
        dispatched.len(),
        dispatch_duration_ms
    );

    Ok(ConversionReport {
        pdf_path,
        stem,
        pages_rasterized: pages.len(),
        dispatched,
        render_duration_ms,
        dispatch_duration_ms,
    })
}

/// Convert every `*.pdf` directly inside `dir`, one after another.
///
/// Stops at the first failing document.
pub async fn convert_dir<R: PageRenderer>(
    dir: impl AsRef<Path>,
    renderer: &R,
    config: &ConversionConfig,
) -> Result<Vec<ConversionReport>, Pdf2ImgError> {
    let pdfs = discover::list_pdfs(dir.as_ref())?;
    info!("Found {} PDFs in {}", pdfs.len(), dir.as_ref().display());

    let mut reports = Vec::with_capacity(pdfs.len());
    for pdf in &pdfs {
        reports.push(convert(pdf, renderer, config).await?);
    }
    Ok(reports)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync<R: PageRenderer>(
    pdf_path: impl AsRef<Path>,
    renderer: &R,
    config: &ConversionConfig,
) -> Result<ConversionReport, Pdf2ImgError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2ImgError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(pdf_path, renderer, config))
}

/// Read PDF metadata without rasterising.
pub async fn inspect(
    pdf_path: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2ImgError> {
    let pdf_path = input::resolve_local(pdf_path)?;
    rasterize::extract_metadata(&pdf_path, password).await
}

fn dispatch_params(config: &ConversionConfig) -> DispatchParams {
    DispatchParams {
        wait: config.wait,
        time_secs: config.time_secs,
        convert_to_pdf: config.convert_to_pdf,
        pdf_dir: config.pdf_dir.clone(),
    }
}

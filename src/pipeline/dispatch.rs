//! Ordered dispatch of page images to a [`PageRenderer`].
//!
//! The renderer is the pipeline's only collaborator: whatever does the
//! actual image understanding (a vision model, an external program, a test
//! double) sits behind this trait and owns its own model and tokenizer
//! state. Dispatch awaits each call before starting the next, so the
//! renderer always sees pages in ascending page order.

use crate::error::Pdf2ImgError;
use crate::pipeline::discover::sorted_page_images;
use crate::progress::ProgressCallback;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Values forwarded to the renderer with every image.
///
/// The pipeline never interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchParams {
    pub wait: bool,
    pub time_secs: u64,
    pub convert_to_pdf: bool,
    /// Where a renderer should place PDF output when `convert_to_pdf` is set.
    pub pdf_dir: PathBuf,
}

/// One render call.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub image_path: &'a Path,
    /// 0-based page index parsed from the file name.
    pub page_index: usize,
    pub wait: bool,
    pub time_secs: u64,
    pub convert_to_pdf: bool,
    pub pdf_dir: &'a Path,
}

/// The render port: receives page images in page order.
///
/// Implementations hold whatever model/tokenizer handles they need.
/// Returning `Err` stops the dispatch loop.
pub trait PageRenderer: Send + Sync {
    fn render(
        &self,
        request: RenderRequest<'_>,
    ) -> impl Future<Output = Result<(), Pdf2ImgError>> + Send;
}

/// Hand each `(page_index, path)` to `renderer`, in the given order.
///
/// Returns the number of images dispatched.
pub async fn dispatch_images<R>(
    renderer: &R,
    images: &[(usize, PathBuf)],
    params: &DispatchParams,
    progress: Option<&ProgressCallback>,
) -> Result<usize, Pdf2ImgError>
where
    R: PageRenderer,
{
    let total = images.len();
    if let Some(cb) = progress {
        cb.on_conversion_start(total);
    }

    for (dispatched, (page_index, path)) in images.iter().enumerate() {
        let page_index = *page_index;
        if let Some(cb) = progress {
            cb.on_image_start(page_index, total);
        }
        debug!("Dispatching page {} → {}", page_index, path.display());

        let request = RenderRequest {
            image_path: path,
            page_index,
            wait: params.wait,
            time_secs: params.time_secs,
            convert_to_pdf: params.convert_to_pdf,
            pdf_dir: &params.pdf_dir,
        };

        if let Err(e) = renderer.render(request).await {
            if let Some(cb) = progress {
                cb.on_image_error(page_index, total, &e.to_string());
                cb.on_conversion_complete(total, dispatched);
            }
            return Err(e);
        }

        if let Some(cb) = progress {
            cb.on_image_complete(page_index, total);
        }
    }

    if let Some(cb) = progress {
        cb.on_conversion_complete(total, total);
    }
    Ok(total)
}

/// Discover `{prefix}_*.png` in `dir`, sort by page index, and dispatch.
///
/// # Errors
/// [`Pdf2ImgError::NoImagesFound`] when nothing matches; any discovery,
/// ordering or renderer error otherwise.
pub async fn dispatch_directory<R>(
    renderer: &R,
    dir: &Path,
    prefix: &str,
    params: &DispatchParams,
    progress: Option<&ProgressCallback>,
) -> Result<Vec<PathBuf>, Pdf2ImgError>
where
    R: PageRenderer,
{
    let images = sorted_page_images(dir, prefix)?;
    if images.is_empty() {
        info!("No image file found for '{}' in {}", prefix, dir.display());
        return Err(Pdf2ImgError::NoImagesFound {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
        });
    }

    dispatch_images(renderer, &images, params, progress).await?;
    Ok(images.into_iter().map(|(_, p)| p).collect())
}

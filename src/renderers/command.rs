//! Run an external program once per page image.
//!
//! The program receives the image path as its last argument. Everything else
//! from the [`RenderRequest`] travels in environment variables so existing
//! scripts can pick up only what they need:
//!
//! | Variable | Value |
//! |----------|-------|
//! | `PDF2IMG_PAGE_INDEX` | 0-based page index |
//! | `PDF2IMG_WAIT` | `1` or `0` |
//! | `PDF2IMG_TIME_SECS` | pacing duration |
//! | `PDF2IMG_CONVERT_TO_PDF` | `1` or `0` |
//! | `PDF2IMG_PDF_DIR` | directory for PDF output |
//!
//! A non-zero exit status is reported as [`Pdf2ImgError::RendererFailed`].

use crate::error::Pdf2ImgError;
use crate::pipeline::dispatch::{PageRenderer, RenderRequest};
use std::ffi::OsString;
use tokio::process::Command;
use tracing::debug;

/// A [`PageRenderer`] backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Fixed arguments placed before the image path.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Parse a whitespace-separated command line such as `"ocr-page --fast"`.
    ///
    /// Returns `None` for a blank string.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program).args(parts))
    }
}

fn flag(v: bool) -> &'static str {
    if v {
        "1"
    } else {
        "0"
    }
}

impl PageRenderer for CommandRenderer {
    async fn render(&self, request: RenderRequest<'_>) -> Result<(), Pdf2ImgError> {
        debug!(
            "Running {:?} for page {}",
            self.program, request.page_index
        );

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(request.image_path)
            .env("PDF2IMG_PAGE_INDEX", request.page_index.to_string())
            .env("PDF2IMG_WAIT", flag(request.wait))
            .env("PDF2IMG_TIME_SECS", request.time_secs.to_string())
            .env("PDF2IMG_CONVERT_TO_PDF", flag(request.convert_to_pdf))
            .env("PDF2IMG_PDF_DIR", request.pdf_dir)
            .status()
            .await
            .map_err(|e| Pdf2ImgError::RendererFailed {
                path: request.image_path.to_path_buf(),
                detail: format!("failed to spawn {:?}: {e}", self.program),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(Pdf2ImgError::RendererFailed {
                path: request.image_path.to_path_buf(),
                detail: format!("{:?} exited with {status}", self.program),
            })
        }
    }
}

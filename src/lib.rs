//! # edgequake-pdf2img
//!
//! Rasterise PDF pages to PNG images and hand them, in page order, to a
//! page renderer (a vision model, an OCR program, anything implementing
//! [`PageRenderer`]).
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     validate path, create imgs/ and pdf/
//!  ├─ 2. Raster    every page → imgs/{stem}_{page}.png at dpi/72 scale
//!  ├─ 3. Discover  glob imgs/{stem}_*.png, sort by integer page suffix
//!  └─ 4. Dispatch  renderer.render(..) once per image, in order
//! ```
//!
//! The numeric sort is the ordering guarantee: `report_10.png` is dispatched
//! after `report_2.png`, never between `report_1.png` and `report_2.png`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2img::{convert, CommandRenderer, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().dpi(150).build()?;
//!     let renderer = CommandRenderer::new("ocr-page");
//!     let report = convert("report.pdf", &renderer, &config).await?;
//!     println!("{} pages dispatched", report.dispatched.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## pdfium
//!
//! Rasterisation binds `PDFIUM_LIB_PATH` if set, otherwise a platform
//! library in the working directory, otherwise the system library.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod renderers;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_dir, convert_sync, inspect};
pub use error::Pdf2ImgError;
pub use output::{ConversionReport, DocumentMetadata, RasterizedPage};
pub use pipeline::dispatch::{DispatchParams, PageRenderer, RenderRequest};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use renderers::{CommandRenderer, VlmRenderer};

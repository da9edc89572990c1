//! Result types returned by the conversion entry points.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One PNG written by the rasteriser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterizedPage {
    /// 0-based page index; equals the numeric suffix of `path`.
    pub page_index: usize,
    /// Location of `{stem}_{page_index}.png`.
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Summary of one PDF's trip through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Source document.
    pub pdf_path: PathBuf,
    /// File stem used as the image prefix.
    pub stem: String,
    /// Pages written by the rasteriser in this run.
    pub pages_rasterized: usize,
    /// Images handed to the renderer, in dispatch order.
    pub dispatched: Vec<PathBuf>,
    pub render_duration_ms: u64,
    pub dispatch_duration_ms: u64,
}

/// Document-level metadata read without rasterising.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

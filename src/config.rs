//! Configuration types for PDF rasterisation and dispatch.
//!
//! All pipeline behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The pacing values (`wait`,
//! `time_secs`) and the `convert_to_pdf` flag are never interpreted here;
//! they are forwarded verbatim to the [`crate::PageRenderer`].

use crate::error::Pdf2ImgError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Lowest accepted rendering DPI.
pub const MIN_DPI: u32 = 36;
/// Highest accepted rendering DPI.
pub const MAX_DPI: u32 = 1200;

/// Configuration for a PDF-to-images conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdf2img::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpi(200)
///     .image_dir("out/imgs")
///     .convert_to_pdf(true)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 200);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI. Each page is scaled by `dpi / 72`. Range: 36–1200. Default: 150.
    ///
    /// PDF user space is 72 units per inch, so 72 DPI renders a page at its
    /// nominal point size and 150 DPI at roughly twice that.
    pub dpi: u32,

    /// Directory receiving `{stem}_{page}.png` files. Created if absent. Default: `imgs`.
    pub image_dir: PathBuf,

    /// Directory handed to the renderer for PDF output. Created if absent. Default: `pdf`.
    pub pdf_dir: PathBuf,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Renderer pacing flag, forwarded as-is. Default: false.
    pub wait: bool,

    /// Renderer pacing duration in seconds, forwarded as-is. Default: 0.
    pub time_secs: u64,

    /// Ask the renderer to reassemble its output into a PDF. Default: false.
    pub convert_to_pdf: bool,

    /// Optional per-image progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 150,
            image_dir: PathBuf::from("imgs"),
            pdf_dir: PathBuf::from("pdf"),
            password: None,
            wait: false,
            time_secs: 0,
            convert_to_pdf: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("image_dir", &self.image_dir)
            .field("pdf_dir", &self.pdf_dir)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("wait", &self.wait)
            .field("time_secs", &self.time_secs)
            .field("convert_to_pdf", &self.convert_to_pdf)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Rasterisation scale factor derived from [`Self::dpi`].
    pub fn scale(&self) -> f32 {
        crate::pipeline::rasterize::scale_factor(self.dpi)
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.image_dir = dir.into();
        self
    }

    pub fn pdf_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.pdf_dir = dir.into();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn wait(mut self, v: bool) -> Self {
        self.config.wait = v;
        self
    }

    pub fn time_secs(mut self, secs: u64) -> Self {
        self.config.time_secs = secs;
        self
    }

    pub fn convert_to_pdf(mut self, v: bool) -> Self {
        self.config.convert_to_pdf = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2ImgError> {
        let c = &self.config;
        if !(MIN_DPI..=MAX_DPI).contains(&c.dpi) {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "DPI must be {MIN_DPI}–{MAX_DPI}, got {}",
                c.dpi
            )));
        }
        if c.image_dir.as_os_str().is_empty() {
            return Err(Pdf2ImgError::InvalidConfig(
                "Image directory must not be empty".into(),
            ));
        }
        if c.pdf_dir.as_os_str().is_empty() {
            return Err(Pdf2ImgError::InvalidConfig(
                "PDF directory must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

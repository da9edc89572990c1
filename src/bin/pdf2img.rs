//! CLI binary for edgequake-pdf2img.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, picks a renderer and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2img::{
    convert, convert_dir, inspect, CommandRenderer, ConversionConfig, ConversionProgressCallback,
    ConversionReport, PageRenderer, ProgressCallback, VlmRenderer,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

/// "Page n/total" with a 1-based page number.
fn page_label(page_index: usize, total: usize) -> String {
    format!("Page {:>3}/{:<3}", page_index + 1, total)
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar per PDF plus a log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Rasterising PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.reset();
        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rendering");
    }

    fn elapsed_secs(&self, page_index: usize) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&page_index))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_images: usize) {
        self.activate_bar(total_images);
    }

    fn on_image_start(&self, page_index: usize, _total: usize) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(page_index, Instant::now());
        }
        self.bar.set_message(format!("page {}", page_index + 1));
    }

    fn on_image_complete(&self, page_index: usize, total: usize) {
        let secs = self.elapsed_secs(page_index);
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            page_label(page_index, total),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_image_error(&self, page_index: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs(page_index);

        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {}  {}  {}",
            red("✗"),
            page_label(page_index, total),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
    }

    fn on_conversion_complete(&self, total_images: usize, dispatched: usize) {
        self.bar.finish_and_clear();
        if dispatched == total_images {
            eprintln!(
                "{} {} pages dispatched",
                green("✔"),
                bold(&dispatched.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages dispatched",
                red("✘"),
                bold(&dispatched.to_string()),
                total_images
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Rasterise a PDF into imgs/ and transcribe each page with a vision LLM
  pdf2img report.pdf

  # Every PDF in a directory, 200 DPI
  pdf2img --dpi 200 ./scans

  # Hand each page image to an external program instead
  pdf2img --render-cmd "ocr-page --fast" --convert-to-pdf report.pdf

  # Pause 5 s between pages
  pdf2img --wait --time 5 report.pdf

  # Inspect PDF metadata (no renderer needed)
  pdf2img --inspect-only report.pdf

OUTPUT LAYOUT:
  imgs/{stem}_{page}.png   page images, page index starts at 0
  pdf/                     created for renderers that write PDF output
  md/{stem}_{page}.md      Markdown written by the default VLM renderer

EXTERNAL RENDERER ENVIRONMENT (--render-cmd):
  PDF2IMG_PAGE_INDEX      0-based page index
  PDF2IMG_WAIT            1 or 0
  PDF2IMG_TIME_SECS       value of --time
  PDF2IMG_CONVERT_TO_PDF  1 or 0
  PDF2IMG_PDF_DIR         value of --pdf-dir
  The image path is passed as the last argument.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium
"#;

/// Rasterise PDF pages to PNG and dispatch them to a page renderer.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Rasterise PDF pages to PNG and dispatch them, in order, to a page renderer",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file, or a directory whose *.pdf files are converted one by one.
    input: PathBuf,

    /// Rendering DPI (36–1200).
    #[arg(long, env = "PDF2IMG_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(36..=1200))]
    dpi: u32,

    /// Directory for page images.
    #[arg(long, env = "PDF2IMG_IMAGE_DIR", default_value = "imgs")]
    image_dir: PathBuf,

    /// Directory handed to the renderer for PDF output.
    #[arg(long, env = "PDF2IMG_PDF_DIR", default_value = "pdf")]
    pdf_dir: PathBuf,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2IMG_PASSWORD")]
    password: Option<String>,

    /// Renderer pacing flag.
    #[arg(long, env = "PDF2IMG_WAIT")]
    wait: bool,

    /// Renderer pacing duration in seconds.
    #[arg(long = "time", env = "PDF2IMG_TIME", default_value_t = 0)]
    time_secs: u64,

    /// Ask the renderer to reassemble its output into a PDF.
    #[arg(long, env = "PDF2IMG_CONVERT_TO_PDF")]
    convert_to_pdf: bool,

    /// External command run once per page image (replaces the VLM renderer).
    #[arg(long, env = "PDF2IMG_RENDER_CMD")]
    render_cmd: Option<String>,

    /// LLM provider for the VLM renderer: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM model ID for the VLM renderer.
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Directory for Markdown written by the VLM renderer.
    #[arg(long, env = "PDF2IMG_OUTPUT_DIR", default_value = "md")]
    output_dir: PathBuf,

    /// Print conversion reports as JSON.
    #[arg(long, env = "PDF2IMG_JSON")]
    json: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2IMG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs while it is visible.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input, cli.password.as_deref())
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
        }
        return Ok(());
    }

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Pick a renderer and run ──────────────────────────────────────────
    let reports = match cli.render_cmd.as_deref() {
        Some(line) => {
            let renderer = CommandRenderer::from_command_line(line)
                .context("--render-cmd must name a program")?;
            run(&cli, &renderer, &config).await?
        }
        None => {
            let renderer = VlmRenderer::from_env(
                cli.provider.as_deref(),
                cli.model.as_deref(),
                cli.output_dir.clone(),
            )
            .context("Failed to set up the VLM renderer")?;
            run(&cli, &renderer, &config).await?
        }
    };

    print_reports(&cli, &reports)
}

/// Convert a single file or every PDF in a directory.
async fn run<R: PageRenderer>(
    cli: &Cli,
    renderer: &R,
    config: &ConversionConfig,
) -> Result<Vec<ConversionReport>> {
    if cli.input.is_dir() {
        convert_dir(&cli.input, renderer, config)
            .await
            .with_context(|| format!("Conversion failed in {}", cli.input.display()))
    } else {
        let report = convert(&cli.input, renderer, config)
            .await
            .with_context(|| format!("Conversion failed for {}", cli.input.display()))?;
        Ok(vec![report])
    }
}

fn print_reports(cli: &Cli, reports: &[ConversionReport]) -> Result<()> {
    if cli.json {
        let json = serde_json::to_string_pretty(reports).context("Failed to serialise reports")?;
        println!("{json}");
        return Ok(());
    }

    if cli.quiet {
        return Ok(());
    }

    if reports.is_empty() {
        eprintln!("No PDF files found in {}", cli.input.display());
    }
    for r in reports {
        eprintln!(
            "{}  {}  {} pages  {}ms raster / {}ms render  →  {}",
            green("✔"),
            bold(&r.stem),
            r.dispatched.len(),
            r.render_duration_ms,
            r.dispatch_duration_ms,
            dim(&cli.image_dir.display().to_string()),
        );
    }
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .image_dir(cli.image_dir.clone())
        .pdf_dir(cli.pdf_dir.clone())
        .wait(cli.wait)
        .time_secs(cli.time_secs)
        .convert_to_pdf(cli.convert_to_pdf);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

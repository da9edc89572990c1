//! End-to-end tests for edgequake-pdf2img.
//!
//! These tests rasterise real PDFs and therefore need a pdfium library
//! (`PDFIUM_LIB_PATH`, the working directory, or the system path). They are
//! gated behind the `E2E_ENABLED` environment variable so they do not run in
//! CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=./libpdfium.so cargo test --test e2e -- --nocapture
//!
//! The PDFs are generated in code, so no fixture files are needed.

use edgequake_pdf2img::pipeline::rasterize::rasterize_pdf;
use edgequake_pdf2img::{
    convert, convert_dir, inspect, ConversionConfig, PageRenderer, Pdf2ImgError, RenderRequest,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

macro_rules! e2e_skip_unless_enabled {
    () => {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    };
}

/// Build a minimal PDF with `pages` pages of 200×100 pt.
///
/// Each page carries a black bar whose width depends on the page index, so
/// rendered pages differ from each other.
fn minimal_pdf(pages: usize) -> Vec<u8> {
    let first_page_obj = 3;
    let kids: Vec<String> = (0..pages)
        .map(|i| format!("{} 0 R", first_page_obj + 2 * i))
        .collect();

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages
        ),
    ];
    for i in 0..pages {
        let content = format!("0 0 0 rg 10 40 {} 20 re f", 20 + 40 * i);
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 200 100] /Contents {} 0 R >>",
            first_page_obj + 2 * i + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for off in offsets {
        out.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    out
}

fn write_pdf(dir: &Path, name: &str, pages: usize) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, minimal_pdf(pages)).expect("write test pdf");
    path
}

fn config_in(root: &Path, dpi: u32) -> ConversionConfig {
    ConversionConfig::builder()
        .dpi(dpi)
        .image_dir(root.join("imgs"))
        .pdf_dir(root.join("pdf"))
        .build()
        .expect("valid config")
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[derive(Default)]
struct RecordingRenderer {
    seen: Mutex<Vec<PathBuf>>,
}

impl PageRenderer for RecordingRenderer {
    async fn render(&self, request: RenderRequest<'_>) -> Result<(), Pdf2ImgError> {
        assert!(request.image_path.is_file(), "renderer got a missing image");
        self.seen.lock().unwrap().push(request.image_path.to_path_buf());
        Ok(())
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn three_page_report_is_dispatched_in_page_order() {
    e2e_skip_unless_enabled!();
    let tmp = TempDir::new().unwrap();
    let pdf = write_pdf(tmp.path(), "report.pdf", 3);
    let config = config_in(tmp.path(), 150);
    let renderer = RecordingRenderer::default();

    let report = convert(&pdf, &renderer, &config)
        .await
        .expect("conversion should succeed");

    assert_eq!(report.stem, "report");
    assert_eq!(report.pages_rasterized, 3);
    assert_eq!(
        file_names(&report.dispatched),
        ["report_0.png", "report_1.png", "report_2.png"]
    );
    assert_eq!(*renderer.seen.lock().unwrap(), report.dispatched);
    assert!(tmp.path().join("pdf").is_dir());
}

#[tokio::test]
async fn eleven_pages_sort_numerically() {
    e2e_skip_unless_enabled!();
    let tmp = TempDir::new().unwrap();
    let pdf = write_pdf(tmp.path(), "book.pdf", 11);
    let renderer = RecordingRenderer::default();

    convert(&pdf, &renderer, &config_in(tmp.path(), 72))
        .await
        .expect("conversion should succeed");

    let seen = renderer.seen.lock().unwrap();
    let expected: Vec<String> = (0..11).map(|i| format!("book_{i}.png")).collect();
    assert_eq!(file_names(&seen), expected);
}

#[tokio::test]
async fn rasterising_writes_one_png_per_page_at_dpi_scale() {
    e2e_skip_unless_enabled!();
    let tmp = TempDir::new().unwrap();
    let pdf = write_pdf(tmp.path(), "scan.pdf", 2);

    let pages = rasterize_pdf(&pdf, tmp.path(), 144, None)
        .await
        .expect("rasterise should succeed");

    assert_eq!(pages.len(), 2);
    for (i, page) in pages.iter().enumerate() {
        assert_eq!(page.page_index, i);
        assert!(page.path.ends_with(format!("scan_{i}.png")));
        // 200×100 pt at 144 DPI → 400×200 px
        assert!(page.width.abs_diff(400) <= 1, "width {}", page.width);
        assert!(page.height.abs_diff(200) <= 1, "height {}", page.height);
    }
}

#[tokio::test]
async fn rerun_overwrites_with_identical_images() {
    e2e_skip_unless_enabled!();
    let tmp = TempDir::new().unwrap();
    let pdf = write_pdf(tmp.path(), "same.pdf", 2);

    let first = rasterize_pdf(&pdf, tmp.path(), 100, None).await.unwrap();
    let before: Vec<Vec<u8>> = first.iter().map(|p| std::fs::read(&p.path).unwrap()).collect();

    let second = rasterize_pdf(&pdf, tmp.path(), 100, None).await.unwrap();
    let after: Vec<Vec<u8>> = second.iter().map(|p| std::fs::read(&p.path).unwrap()).collect();

    assert_eq!(before, after);
    assert_ne!(before[0], before[1], "pages should render differently");
}

#[tokio::test]
async fn corrupt_pdf_fails_without_panicking() {
    e2e_skip_unless_enabled!();
    let tmp = TempDir::new().unwrap();
    let broken = tmp.path().join("broken.pdf");
    std::fs::write(&broken, b"%PDF-1.4\nthis is not really a pdf").unwrap();

    let result = rasterize_pdf(&broken, tmp.path(), 150, None).await;
    assert!(result.is_err(), "corrupt PDF must be reported as an error");

    let renderer = RecordingRenderer::default();
    let err = convert(&broken, &renderer, &config_in(tmp.path(), 150))
        .await
        .unwrap_err();
    assert!(!err.is_no_images());
    assert!(renderer.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn directory_mode_converts_each_pdf() {
    e2e_skip_unless_enabled!();
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    std::fs::create_dir(&input).unwrap();
    write_pdf(&input, "b.pdf", 1);
    write_pdf(&input, "a.pdf", 2);

    let renderer = RecordingRenderer::default();
    let reports = convert_dir(&input, &renderer, &config_in(tmp.path(), 72))
        .await
        .expect("directory conversion should succeed");

    assert_eq!(
        reports.iter().map(|r| r.stem.as_str()).collect::<Vec<_>>(),
        ["a", "b"]
    );
    assert_eq!(
        file_names(&renderer.seen.lock().unwrap()),
        ["a_0.png", "a_1.png", "b_0.png"]
    );
}

#[tokio::test]
async fn inspect_reports_page_count() {
    e2e_skip_unless_enabled!();
    let tmp = TempDir::new().unwrap();
    let pdf = write_pdf(tmp.path(), "meta.pdf", 4);

    let meta = inspect(&pdf, None).await.expect("inspect should succeed");
    assert_eq!(meta.page_count, 4);
    assert!(!meta.pdf_version.is_empty());
}

// ── Always-on checks (no pdfium needed) ──────────────────────────────────────

#[test]
fn generated_pdf_has_header_and_trailer() {
    let bytes = minimal_pdf(3);
    assert!(bytes.starts_with(b"%PDF-1.4"));
    assert!(bytes.ends_with(b"%%EOF\n"));
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("/Count 3"));
}

#[tokio::test]
async fn nonexistent_input_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let renderer = RecordingRenderer::default();
    let err = convert(
        tmp.path().join("nope.pdf"),
        &renderer,
        &config_in(tmp.path(), 150),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Pdf2ImgError::FileNotFound { .. }));
}

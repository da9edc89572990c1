//! Vision-LLM renderer: transcribe each page image to Markdown.
//!
//! Each call sends the PNG (base64, `detail: "high"`) with a transcription
//! prompt and writes the reply to `{output_dir}/{image_stem}.md`. The
//! renderer writes Markdown only; when a request asks for PDF output it is
//! logged once and otherwise ignored.
//!
//! `wait` and `time_secs` are treated as pacing: with `wait` set the renderer
//! sleeps `time_secs` after each page, which keeps long documents under
//! provider rate limits without any retry machinery.

use crate::error::Pdf2ImgError;
use crate::pipeline::dispatch::{PageRenderer, RenderRequest};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// Model used when a provider is named without one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Default transcription prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an expert document transcriber. Convert the page image to clean Markdown.

- Preserve all text in reading order.
- Use #, ##, ### for headings, - and 1. for lists, GFM pipe tables for tables.
- Render formulas as LaTeX ($inline$, $$display$$).
- Skip page numbers and repeated headers or footers.
- Output only the Markdown. Do not wrap it in ``` fences and do not add commentary."#;

/// A [`PageRenderer`] that sends page images to a vision LLM.
pub struct VlmRenderer {
    provider: Arc<dyn LLMProvider>,
    output_dir: PathBuf,
    system_prompt: String,
    temperature: f32,
    max_tokens: usize,
    pdf_warned: AtomicBool,
}

impl VlmRenderer {
    pub fn new(provider: Arc<dyn LLMProvider>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            output_dir: output_dir.into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: 0.1,
            max_tokens: 4096,
            pdf_warned: AtomicBool::new(false),
        }
    }

    /// Resolve a provider by name/model or from the environment.
    ///
    /// Resolution order:
    /// 1. `provider_name` (+ `model`, default [`DEFAULT_MODEL`])
    /// 2. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, when both are set
    /// 3. `OPENAI_API_KEY` → OpenAI
    /// 4. [`ProviderFactory::from_env`] auto-detection
    pub fn from_env(
        provider_name: Option<&str>,
        model: Option<&str>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, Pdf2ImgError> {
        let provider = resolve_provider(provider_name, model)?;
        Ok(Self::new(provider, output_dir))
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_temperature(mut self, t: f32) -> Self {
        self.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn with_max_tokens(mut self, n: usize) -> Self {
        self.max_tokens = n;
        self
    }

    /// Where the Markdown for `image_path` is written.
    pub fn output_path_for(&self, image_path: &Path) -> PathBuf {
        markdown_path(&self.output_dir, image_path)
    }

    fn build_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

impl PageRenderer for VlmRenderer {
    async fn render(&self, request: RenderRequest<'_>) -> Result<(), Pdf2ImgError> {
        let start = Instant::now();
        let failed = |detail: String| Pdf2ImgError::RendererFailed {
            path: request.image_path.to_path_buf(),
            detail,
        };

        if request.convert_to_pdf && !self.pdf_warned.swap(true, Ordering::Relaxed) {
            warn!("VLM renderer writes Markdown only; convert_to_pdf is ignored");
        }

        let png = tokio::fs::read(request.image_path)
            .await
            .map_err(|e| failed(format!("read image: {e}")))?;
        let image = encode_png(&png);

        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user_with_images("", vec![image]),
        ];
        let options = self.build_options();

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| failed(e.to_string()))?;
        debug!(
            "Page {}: {} input tokens, {} output tokens, {:?}",
            request.page_index,
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| failed(format!("create {}: {e}", self.output_dir.display())))?;
        let out = self.output_path_for(request.image_path);
        tokio::fs::write(&out, tidy_markdown(&response.content))
            .await
            .map_err(|e| failed(format!("write {}: {e}", out.display())))?;
        info!("Wrote {}", out.display());

        if request.wait && request.time_secs > 0 {
            sleep(Duration::from_secs(request.time_secs)).await;
        }
        Ok(())
    }
}

/// Wrap PNG bytes as base64 `ImageData` for the chat API.
fn encode_png(png: &[u8]) -> ImageData {
    ImageData::new(STANDARD.encode(png), "image/png").with_detail("high")
}

fn markdown_path(output_dir: &Path, image_path: &Path) -> PathBuf {
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    output_dir.join(format!("{stem}.md"))
}

/// Strip an outer ```` ```markdown ```` fence and end with one newline.
fn tidy_markdown(input: &str) -> String {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("```markdown\n")
        .or_else(|| trimmed.strip_prefix("```\n"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    format!("{}\n", body.trim_end())
}

fn create_provider(name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, Pdf2ImgError> {
    ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        Pdf2ImgError::InvalidConfig(format!("LLM provider '{name}' is not configured: {e}"))
    })
}

fn resolve_provider(
    provider_name: Option<&str>,
    model: Option<&str>,
) -> Result<Arc<dyn LLMProvider>, Pdf2ImgError> {
    if let Some(name) = provider_name {
        return create_provider(name, model.unwrap_or(DEFAULT_MODEL));
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_provider(&prov, model.unwrap_or(&env_model));
        }
    }

    if std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty()) {
        return create_provider("openai", model.unwrap_or(DEFAULT_MODEL));
    }

    let (llm_provider, _embedding) = ProviderFactory::from_env().map_err(|e| {
        Pdf2ImgError::InvalidConfig(format!(
            "No LLM provider could be auto-detected from environment.\n\
             Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
             Error: {e}"
        ))
    })?;
    Ok(llm_provider)
}

use anyhow::Result;
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::Duration;

use crate::config::Config;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Events emitted while streaming a generated reply
#[derive(Debug, Clone)]
pub enum LlmEvent {
    /// Incremental text from the streaming response
    TextDelta(String),
    /// Stream terminated normally
    StreamComplete,
    /// Stream terminated abnormally
    Error(String),
}

/// One conversation turn in the service's vocabulary (`"user"` or `"model"`)
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

impl Content {
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// A complete generation request: full history plus fixed behavioral settings
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub contents: Vec<Content>,
    pub system_instruction: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Seam between the chat controller and the generation service.
///
/// Implementations hand back a channel of [`LlmEvent`]s and are free to
/// produce them from a live HTTP stream or from a script in tests.
pub trait GenerationBackend: Send {
    fn stream_reply(&self, request: GenerationRequest) -> mpsc::UnboundedReceiver<LlmEvent>;
}

/// Streaming client for the Gemini `streamGenerateContent` endpoint
#[derive(Clone)]
pub struct GeminiClient {
    config: Config,
    client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }
}

impl GenerationBackend for GeminiClient {
    fn stream_reply(&self, request: GenerationRequest) -> mpsc::UnboundedReceiver<LlmEvent> {
        let (tx, rx) = mpsc::unbounded_channel();

        // Credential is resolved per request so an edited config takes
        // effect without restarting; absence is a stream error, not a panic.
        let Some(api_key) = self.config.api_key() else {
            let _ = tx.send(LlmEvent::Error(
                "No API key configured. Set gemini_api_key in config.toml or GEMINI_API_KEY."
                    .to_string(),
            ));
            return rx;
        };

        let client = self.client.clone();
        let base_url = self.base_url.clone();

        let tx_err = tx.clone();
        tokio::spawn(async move {
            if let Err(e) = stream_from_gemini(client, base_url, api_key, request, tx).await {
                tracing::warn!(error = %e, "generation stream failed");
                let _ = tx_err.send(LlmEvent::Error(e.to_string()));
            }
        });

        rx
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    system_instruction: SystemInstruction,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

fn build_payload(request: GenerationRequest) -> GeminiRequest {
    GeminiRequest {
        contents: request.contents,
        system_instruction: SystemInstruction {
            parts: vec![Part {
                text: request.system_instruction,
            }],
        },
        generation_config: GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens,
        },
    }
}

async fn stream_from_gemini(
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    request: GenerationRequest,
    tx: mpsc::UnboundedSender<LlmEvent>,
) -> Result<()> {
    let url = format!(
        "{}/models/{}:streamGenerateContent?alt=sse&key={}",
        base_url, request.model, api_key
    );
    let payload = build_payload(request);

    let response = client
        .post(&url)
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("Gemini API error ({}): {}", status, error_text));
    }

    process_sse_stream(response, tx).await
}

/// Process the `alt=sse` event stream: one `data: {json}` line per chunk,
/// stream end signals completion.
async fn process_sse_stream(
    response: reqwest::Response,
    tx: mpsc::UnboundedSender<LlmEvent>,
) -> Result<()> {
    let mut stream = response.bytes_stream();
    let mut buffer = String::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        buffer.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(newline_pos) = buffer.find('\n') {
            let line = buffer[..newline_pos].trim().to_string();
            buffer = buffer[newline_pos + 1..].to_string();
            handle_sse_line(&line, &tx)?;
        }
    }

    // Flush a trailing line that arrived without its newline
    let line = buffer.trim().to_string();
    handle_sse_line(&line, &tx)?;

    let _ = tx.send(LlmEvent::StreamComplete);
    Ok(())
}

fn handle_sse_line(line: &str, tx: &mpsc::UnboundedSender<LlmEvent>) -> Result<()> {
    let Some(data) = line.strip_prefix("data: ") else {
        return Ok(());
    };

    let chunk: serde_json::Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(_) => return Ok(()),
    };

    if let Some(error) = chunk.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown streaming error");
        return Err(anyhow::anyhow!("Gemini stream error: {}", message));
    }

    if let Some(text) = chunk_text(&chunk) {
        let _ = tx.send(LlmEvent::TextDelta(text));
    }
    Ok(())
}

/// Extract the text of a streamed chunk. Returns `None` for chunks that carry
/// no content parts (e.g. the final usage-metadata chunk).
fn chunk_text(chunk: &serde_json::Value) -> Option<String> {
    let parts = chunk
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let mut text = String::new();
    for part in parts {
        if let Some(piece) = part.get("text").and_then(|t| t.as_str()) {
            text.push_str(piece);
        }
    }
    Some(text)
}

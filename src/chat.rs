//! Conversation state and streaming control for the assistant widget.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::llm::{Content, GenerationBackend, GenerationRequest, LlmEvent};
use crate::suggest;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Role name in the generation service's vocabulary
    pub fn as_wire(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "model",
        }
    }
}

/// A single message in the transcript
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Receiver for the reply currently being generated, tagged with the send
/// generation that created it so a stream stranded by `clear` is never
/// applied to the new transcript.
struct ActiveStream {
    generation: u64,
    rx: mpsc::UnboundedReceiver<LlmEvent>,
}

/// Owns the conversation: message history, pending input, busy flag, and the
/// in-flight reply stream. The host surface calls [`send`](Self::send) /
/// [`clear`](Self::clear) / [`pump`](Self::pump) and re-renders from the
/// accessors; generation failures never escape this type.
pub struct ChatController {
    config: Config,
    backend: Box<dyn GenerationBackend>,
    history: Vec<ChatMessage>,
    pending_input: String,
    busy: bool,
    panel_open: bool,
    generation: u64,
    stream: Option<ActiveStream>,
}

impl ChatController {
    pub fn new(config: Config, backend: Box<dyn GenerationBackend>) -> Self {
        let greeting = ChatMessage::new(Role::Assistant, config.assistant.greeting.clone());
        Self {
            config,
            backend,
            history: vec![greeting],
            pending_input: String::new(),
            busy: false,
            panel_open: false,
            generation: 0,
            stream: None,
        }
    }

    /// Send a message: an explicit text (quick-reply prompts) or the pending
    /// input. Silently does nothing when the trimmed text is empty or a
    /// reply is already in flight.
    pub fn send(&mut self, explicit: Option<&str>) {
        let resolved = explicit.unwrap_or(&self.pending_input).trim().to_string();
        if resolved.is_empty() || self.busy {
            return;
        }

        self.pending_input.clear();
        self.history.push(ChatMessage::new(Role::User, resolved));
        self.busy = true;
        self.generation += 1;
        tracing::debug!(generation = self.generation, "sending message");

        let request = self.build_request();
        // The reply slot exists before the first chunk can be observed
        self.history.push(ChatMessage::new(Role::Assistant, String::new()));

        let rx = self.backend.stream_reply(request);
        self.stream = Some(ActiveStream {
            generation: self.generation,
            rx,
        });
    }

    /// Drain whatever the reply stream has produced so far. Returns true if
    /// any observable state changed. Non-blocking; the host calls this from
    /// its event loop.
    pub fn pump(&mut self) -> bool {
        let Some(mut stream) = self.stream.take() else {
            return false;
        };
        if stream.generation != self.generation {
            // Stranded by clear; drop it unread
            return false;
        }

        let mut changed = false;
        loop {
            match stream.rx.try_recv() {
                Ok(LlmEvent::TextDelta(delta)) => {
                    if let Some(reply) = self.history.last_mut() {
                        reply.text.push_str(&delta);
                    }
                    changed = true;
                }
                Ok(LlmEvent::StreamComplete) => {
                    tracing::debug!("reply stream complete");
                    self.busy = false;
                    return true;
                }
                Ok(LlmEvent::Error(error)) => {
                    tracing::warn!(%error, "generation failed; substituting fallback reply");
                    self.substitute_fallback();
                    return true;
                }
                Err(mpsc::error::TryRecvError::Empty) => {
                    self.stream = Some(stream);
                    return changed;
                }
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    tracing::warn!("reply stream closed before completing");
                    self.substitute_fallback();
                    return true;
                }
            }
        }
    }

    /// Reset the transcript to a single fresh greeting. Valid in any state;
    /// an in-flight reply is abandoned and its remaining chunks suppressed.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.busy = false;
        self.pending_input.clear();
        self.history = vec![ChatMessage::new(
            Role::Assistant,
            self.config.assistant.cleared_greeting.clone(),
        )];
    }

    pub fn set_pending_input(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
    }

    pub fn open(&mut self) {
        self.panel_open = true;
    }

    pub fn close(&mut self) {
        self.panel_open = false;
    }

    #[allow(dead_code)]
    pub fn toggle_panel(&mut self) {
        self.panel_open = !self.panel_open;
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    #[allow(dead_code)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Quick-reply prompts currently offered to the user
    pub fn suggested_prompts(&self) -> &[String] {
        suggest::visible_prompts(&self.config.assistant, self.history.len(), self.busy)
    }

    /// Full history in the service's vocabulary, excluding the empty reply
    /// slot that is about to be appended.
    fn build_request(&self) -> GenerationRequest {
        let contents = self
            .history
            .iter()
            .map(|message| Content::new(message.role.as_wire(), message.text.clone()))
            .collect();

        GenerationRequest {
            model: self.config.model.clone(),
            contents,
            system_instruction: self.config.assistant.system_instruction.clone(),
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
        }
    }

    fn substitute_fallback(&mut self) {
        if let Some(reply) = self.history.last_mut() {
            reply.text = self.config.assistant.fallback_reply.clone();
        }
        self.busy = false;
    }
}

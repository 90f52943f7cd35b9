//! Transcript display for the chat panel

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::chat::{ChatMessage, Role};

/// Renders the conversation transcript, bottom-anchored like a chat window.
pub struct TranscriptView<'a> {
    messages: &'a [ChatMessage],
    busy: bool,
}

impl<'a> TranscriptView<'a> {
    pub fn new(messages: &'a [ChatMessage], busy: bool) -> Self {
        Self { messages, busy }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("💬 Sohag Intelligence");
        let inner = block.inner(area);
        block.render(area, buf);

        let mut all_lines: Vec<Line> = Vec::new();
        for (i, message) in self.messages.iter().enumerate() {
            let is_in_flight = self.busy && i == self.messages.len() - 1;
            let mut lines = self.message_lines(message, is_in_flight, inner.width);
            all_lines.append(&mut lines);
            all_lines.push(Line::from(vec![Span::raw("")]));
        }

        // Show the tail of the conversation when it overflows
        let height = inner.height as usize;
        let start = all_lines.len().saturating_sub(height);
        for (i, line) in all_lines[start..].iter().enumerate() {
            buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }

    fn message_lines(&self, message: &ChatMessage, in_flight: bool, width: u16) -> Vec<Line> {
        let mut lines = Vec::new();

        let label = match message.role {
            Role::User => "👤 You",
            Role::Assistant => "🤖 Sohag AI",
        };
        let timestamp = message.timestamp.format("%H:%M:%S").to_string();
        let header = format!("{} {} {}", label, timestamp, "─".repeat(16));
        lines.push(Line::from(vec![Span::styled(
            header,
            Style::default().fg(Color::DarkGray),
        )]));

        if in_flight && message.text.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled("thinking", Style::default().fg(Color::Green)),
                Span::styled(thinking_dots(), Style::default().fg(Color::Yellow)),
            ]));
            return lines;
        }

        let style = match message.role {
            Role::User => Style::default().fg(Color::Blue),
            Role::Assistant => Style::default().fg(Color::Green),
        };

        let content_lines = wrap_text(&message.text, width.saturating_sub(2) as usize);
        let last = content_lines.len().saturating_sub(1);
        for (i, content_line) in content_lines.into_iter().enumerate() {
            let mut spans = vec![Span::raw("  "), Span::styled(content_line, style)];
            if in_flight && i == last {
                spans.push(Span::styled("▋", Style::default().fg(Color::Yellow)));
            }
            lines.push(Line::from(spans));
        }

        lines
    }
}

/// Animated ellipsis for the in-flight reply
fn thinking_dots() -> &'static str {
    let phase = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        / 300
        % 4;
    match phase {
        0 => ".",
        1 => "..",
        2 => "...",
        _ => "   ",
    }
}

/// Wrap text to fit within the given width
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

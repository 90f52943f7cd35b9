use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use super::commands::{SlashCommand, parse_slash_command};

/// Result of feeding one key event to the composer
#[derive(Debug, PartialEq)]
pub enum ComposerResult {
    /// Content changed; the host should mirror it into the controller
    Edited,
    /// User pressed Enter on a non-empty message
    Submitted,
    /// User entered a slash command
    Command(SlashCommand),
    None,
}

/// Single-line input editor for the chat panel. The composer is a plain
/// editor; emptying it after a successful send is the host's job, which
/// keeps the controller's pending input the single source of truth.
pub struct Composer {
    content: String,
    cursor: usize, // char index
    placeholder: String,
    has_focus: bool,
}

impl Composer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            placeholder: placeholder.into(),
            has_focus: true,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }

        match key.code {
            KeyCode::Enter => {
                if self.content.trim().is_empty() {
                    ComposerResult::None
                } else if let Some(command) = parse_slash_command(&self.content) {
                    ComposerResult::Command(command)
                } else {
                    ComposerResult::Submitted
                }
            }
            KeyCode::Char(c) => {
                let at = self.byte_index();
                self.content.insert(at, c);
                self.cursor += 1;
                ComposerResult::Edited
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index();
                    self.content.remove(at);
                    ComposerResult::Edited
                } else {
                    ComposerResult::None
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.content.chars().count() {
                    let at = self.byte_index();
                    self.content.remove(at);
                    ComposerResult::Edited
                } else {
                    ComposerResult::None
                }
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                ComposerResult::None
            }
            KeyCode::Right => {
                if self.cursor < self.content.chars().count() {
                    self.cursor += 1;
                }
                ComposerResult::None
            }
            KeyCode::Home => {
                self.cursor = 0;
                ComposerResult::None
            }
            KeyCode::End => {
                self.cursor = self.content.chars().count();
                ComposerResult::None
            }
            _ => ComposerResult::None,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.content.chars().count();
    }

    #[allow(dead_code)]
    pub fn set_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }

    /// Byte offset of the cursor's char index
    fn byte_index(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let border_color = if self.has_focus {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(area);
        block.render(area, buf);

        let line = if self.content.is_empty() {
            let mut spans = Vec::new();
            if self.has_focus {
                spans.push(Span::styled("▋", Style::default().fg(Color::Yellow)));
            }
            spans.push(Span::styled(
                self.placeholder.clone(),
                Style::default().fg(Color::DarkGray),
            ));
            Line::from(spans)
        } else {
            let at = self.byte_index();
            let (before, after) = self.content.split_at(at);
            let mut spans = vec![Span::styled(
                before.to_string(),
                Style::default().fg(Color::White),
            )];
            if self.has_focus {
                spans.push(Span::styled("▋", Style::default().fg(Color::Yellow)));
            }
            spans.push(Span::styled(
                after.to_string(),
                Style::default().fg(Color::White),
            ));
            Line::from(spans)
        };

        buf.set_line(inner.x, inner.y, &line, inner.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(composer: &mut Composer, text: &str) {
        for c in text.chars() {
            composer.handle_key(press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn typing_builds_content() {
        let mut composer = Composer::new("ask");
        type_str(&mut composer, "hello");
        assert_eq!(composer.content(), "hello");
    }

    #[test]
    fn editing_respects_cursor_position() {
        let mut composer = Composer::new("ask");
        type_str(&mut composer, "helo");
        composer.handle_key(press(KeyCode::Left));
        composer.handle_key(press(KeyCode::Char('l')));
        assert_eq!(composer.content(), "hello");

        composer.handle_key(press(KeyCode::Home));
        composer.handle_key(press(KeyCode::Delete));
        assert_eq!(composer.content(), "ello");

        composer.handle_key(press(KeyCode::End));
        composer.handle_key(press(KeyCode::Backspace));
        assert_eq!(composer.content(), "ell");
    }

    #[test]
    fn handles_multibyte_characters() {
        let mut composer = Composer::new("ask");
        type_str(&mut composer, "héllo");
        composer.handle_key(press(KeyCode::Backspace));
        composer.handle_key(press(KeyCode::Backspace));
        assert_eq!(composer.content(), "hél");
    }

    #[test]
    fn enter_on_blank_content_does_nothing() {
        let mut composer = Composer::new("ask");
        type_str(&mut composer, "   ");
        assert_eq!(composer.handle_key(press(KeyCode::Enter)), ComposerResult::None);
    }

    #[test]
    fn enter_submits_text_without_clearing_it() {
        let mut composer = Composer::new("ask");
        type_str(&mut composer, "hi there");
        assert_eq!(
            composer.handle_key(press(KeyCode::Enter)),
            ComposerResult::Submitted
        );
        assert_eq!(composer.content(), "hi there");
    }

    #[test]
    fn enter_recognizes_slash_commands() {
        let mut composer = Composer::new("ask");
        type_str(&mut composer, "/clear");
        assert_eq!(
            composer.handle_key(press(KeyCode::Enter)),
            ComposerResult::Command(SlashCommand::Clear)
        );
    }
}

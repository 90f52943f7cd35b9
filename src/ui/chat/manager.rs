//! Panel manager: routes terminal events into the chat controller and
//! renders the widget.

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::commands::{SlashCommand, help_text};
use super::composer::{Composer, ComposerResult};
use super::history::TranscriptView;
use crate::chat::ChatController;

const COMPOSER_PLACEHOLDER: &str = "Ask about my background...";

/// The floating assistant widget: a closed launcher state and an open panel
/// with transcript, quick questions, and composer.
pub struct ChatPanel {
    controller: ChatController,
    composer: Composer,
    selected_suggestion: usize,
    show_help: bool,
    should_quit: bool,
}

impl ChatPanel {
    pub fn new(controller: ChatController) -> Self {
        Self {
            controller,
            composer: Composer::new(COMPOSER_PLACEHOLDER),
            selected_suggestion: 0,
            show_help: false,
            should_quit: false,
        }
    }

    /// Run until the user quits. Owns terminal setup and teardown.
    pub fn run(mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        loop {
            self.controller.pump();
            terminal.draw(|frame| self.draw(frame))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if !self.controller.is_panel_open() {
            match key.code {
                KeyCode::Char('o') | KeyCode::Enter => self.controller.open(),
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                _ => {}
            }
            return;
        }

        let suggestions = self.controller.suggested_prompts().len();
        let picking = suggestions > 0 && self.composer.is_blank();

        match key.code {
            KeyCode::Esc => self.controller.close(),
            KeyCode::Up if picking => {
                self.selected_suggestion = self
                    .selected_suggestion
                    .checked_sub(1)
                    .unwrap_or(suggestions - 1);
            }
            KeyCode::Down if picking => {
                self.selected_suggestion = (self.selected_suggestion + 1) % suggestions;
            }
            KeyCode::Enter if picking => {
                let prompt = self
                    .controller
                    .suggested_prompts()
                    .get(self.selected_suggestion)
                    .cloned();
                if let Some(prompt) = prompt {
                    self.controller.send(Some(&prompt));
                    self.selected_suggestion = 0;
                }
            }
            _ => match self.composer.handle_key(key) {
                ComposerResult::Edited => {
                    self.controller.set_pending_input(self.composer.content());
                }
                ComposerResult::Submitted => {
                    self.controller.set_pending_input(self.composer.content());
                    self.controller.send(None);
                    // Accepted sends leave pending input empty; rejected ones
                    // keep the user's text in place
                    self.composer.set_content(self.controller.pending_input());
                    self.selected_suggestion = 0;
                }
                ComposerResult::Command(command) => self.run_command(command),
                ComposerResult::None => {}
            },
        }
    }

    fn run_command(&mut self, command: SlashCommand) {
        self.composer.set_content("");
        self.controller.set_pending_input("");
        match command {
            SlashCommand::Clear => {
                self.controller.clear();
                self.selected_suggestion = 0;
            }
            SlashCommand::Close => self.controller.close(),
            SlashCommand::Help => self.show_help = !self.show_help,
            SlashCommand::Quit => self.should_quit = true,
        }
    }

    fn draw(&self, frame: &mut Frame) {
        if !self.controller.is_panel_open() {
            self.draw_launcher(frame);
            return;
        }

        let suggestions = self.controller.suggested_prompts();
        let mut constraints = vec![Constraint::Min(5)];
        if !suggestions.is_empty() {
            constraints.push(Constraint::Length(suggestions.len() as u16 + 1));
        }
        constraints.push(Constraint::Length(3));
        constraints.push(Constraint::Length(1));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(frame.size());

        let buf = frame.buffer_mut();
        let mut next = 0;

        TranscriptView::new(self.controller.history(), self.controller.is_busy())
            .render(chunks[next], buf);
        next += 1;

        if !suggestions.is_empty() {
            let area = chunks[next];
            next += 1;
            let header = Line::from(vec![Span::styled(
                "  QUICK QUESTIONS",
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(area.x, area.y, &header, area.width);
            for (i, prompt) in suggestions.iter().enumerate() {
                let selected = i == self.selected_suggestion;
                let (marker, color) = if selected {
                    ("▶ ", Color::Yellow)
                } else {
                    ("  ", Color::Gray)
                };
                let line = Line::from(vec![
                    Span::raw("  "),
                    Span::styled(marker, Style::default().fg(Color::Yellow)),
                    Span::styled(prompt.clone(), Style::default().fg(color)),
                ]);
                buf.set_line(area.x, area.y + 1 + i as u16, &line, area.width);
            }
        }

        self.composer.render(chunks[next], buf);
        next += 1;

        let status = if self.show_help {
            Line::from(vec![Span::styled(
                help_text(),
                Style::default().fg(Color::DarkGray),
            )])
        } else if self.controller.is_busy() {
            Line::from(vec![Span::styled(
                " streaming reply…",
                Style::default().fg(Color::Green),
            )])
        } else {
            Line::from(vec![Span::styled(
                " Enter send · ↑/↓ quick question · Esc close · /help commands",
                Style::default().fg(Color::DarkGray),
            )])
        };
        let area = chunks[next];
        buf.set_line(area.x, area.y, &status, area.width);
    }

    fn draw_launcher(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(45),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(frame.size());

        let launcher = Paragraph::new(vec![
            Line::from(vec![Span::styled(
                "🤖 Sohag Intelligence",
                Style::default().fg(Color::Yellow),
            )]),
            Line::from(vec![Span::raw("")]),
            Line::from(vec![Span::styled(
                "press o to open the assistant · q to quit",
                Style::default().fg(Color::DarkGray),
            )]),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(launcher, chunks[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm::{GenerationBackend, GenerationRequest, LlmEvent};
    use crossterm::event::KeyModifiers;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;

    /// Backend whose streams stay open until the test hangs up.
    #[derive(Clone, Default)]
    struct OpenBackend {
        requests: Arc<Mutex<Vec<GenerationRequest>>>,
        tx: Arc<Mutex<Option<mpsc::UnboundedSender<LlmEvent>>>>,
    }

    impl GenerationBackend for OpenBackend {
        fn stream_reply(&self, request: GenerationRequest) -> mpsc::UnboundedReceiver<LlmEvent> {
            let (tx, rx) = mpsc::unbounded_channel();
            *self.tx.lock().unwrap() = Some(tx);
            self.requests.lock().unwrap().push(request);
            rx
        }
    }

    fn panel() -> (ChatPanel, OpenBackend) {
        let backend = OpenBackend::default();
        let controller = ChatController::new(Config::default(), Box::new(backend.clone()));
        (ChatPanel::new(controller), backend)
    }

    fn press(panel: &mut ChatPanel, code: KeyCode) {
        panel.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(panel: &mut ChatPanel, text: &str) {
        for c in text.chars() {
            press(panel, KeyCode::Char(c));
        }
    }

    #[test]
    fn launcher_keys_open_and_quit() {
        let (mut panel, _) = panel();
        assert!(!panel.controller.is_panel_open());
        press(&mut panel, KeyCode::Char('o'));
        assert!(panel.controller.is_panel_open());
        press(&mut panel, KeyCode::Esc);
        assert!(!panel.controller.is_panel_open());
        press(&mut panel, KeyCode::Char('q'));
        assert!(panel.should_quit);
    }

    #[test]
    fn typing_mirrors_into_pending_input() {
        let (mut panel, _) = panel();
        press(&mut panel, KeyCode::Char('o'));
        type_str(&mut panel, "hello");
        assert_eq!(panel.controller.pending_input(), "hello");
    }

    #[test]
    fn enter_sends_composed_message() {
        let (mut panel, backend) = panel();
        press(&mut panel, KeyCode::Char('o'));
        type_str(&mut panel, "What are his core technical skills?");
        press(&mut panel, KeyCode::Enter);

        assert!(panel.controller.is_busy());
        assert_eq!(panel.composer.content(), "");
        assert_eq!(panel.controller.pending_input(), "");
        assert_eq!(backend.requests.lock().unwrap().len(), 1);
    }

    #[test]
    fn rejected_send_keeps_composer_text() {
        let (mut panel, backend) = panel();
        press(&mut panel, KeyCode::Char('o'));
        type_str(&mut panel, "first");
        press(&mut panel, KeyCode::Enter);

        type_str(&mut panel, "second");
        press(&mut panel, KeyCode::Enter);

        // Still busy with the first reply; the second message stays put
        assert_eq!(panel.composer.content(), "second");
        assert_eq!(panel.controller.pending_input(), "second");
        assert_eq!(backend.requests.lock().unwrap().len(), 1);
    }

    #[test]
    fn enter_with_empty_composer_sends_selected_suggestion() {
        let (mut panel, backend) = panel();
        press(&mut panel, KeyCode::Char('o'));
        press(&mut panel, KeyCode::Down);
        press(&mut panel, KeyCode::Enter);

        let requests = backend.requests.lock().unwrap();
        let sent = &requests[0].contents.last().unwrap().parts[0].text;
        assert_eq!(sent, &Config::default().assistant.suggested_prompts[1]);
    }

    #[test]
    fn suggestion_selection_wraps() {
        let (mut panel, _) = panel();
        press(&mut panel, KeyCode::Char('o'));
        press(&mut panel, KeyCode::Up);
        assert_eq!(panel.selected_suggestion, 3);
        press(&mut panel, KeyCode::Down);
        assert_eq!(panel.selected_suggestion, 0);
    }

    #[test]
    fn clear_command_resets_conversation() {
        let (mut panel, _) = panel();
        press(&mut panel, KeyCode::Char('o'));
        type_str(&mut panel, "/clear");
        press(&mut panel, KeyCode::Enter);

        assert_eq!(panel.controller.history().len(), 1);
        assert_eq!(panel.composer.content(), "");
        assert!(!panel.controller.is_busy());
    }

    #[test]
    fn quit_command_exits() {
        let (mut panel, _) = panel();
        press(&mut panel, KeyCode::Char('o'));
        type_str(&mut panel, "/quit");
        press(&mut panel, KeyCode::Enter);
        assert!(panel.should_quit);
    }
}

//! Interactive chat UI: the render and upload surface for the turn loop

use std::time::Instant;

use crossterm::event::EventStream;
use futures::StreamExt;
use gridtalk_chat::{Render, Turn, TurnContent, TurnLoop};
use gridtalk_tui::{
    App, Theme,
    input::{Action, event_to_action},
    widgets::{ChatMessage, InputBox, MessageList, Spinner, content_height},
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

const HELP_TEXT: &str = "Ask about power flow, bus voltages, or system losses. \
Commands: /image <path> attaches an image to your next question, /image removes \
it, /help shows this text, /quit exits. Ctrl+C also exits.";

const WELCOME_TEXT: &str = "Power system analysis assistant. Ask a question, or \
upload a diagram with /image <path>. /help for commands.";

/// Full projection of the conversation into displayable messages. This is
/// the turn loop's render surface: every call rebuilds the whole list from
/// the snapshot, in order.
#[derive(Default)]
struct TurnView {
    messages: Vec<ChatMessage>,
}

impl Render for TurnView {
    fn render(&mut self, turns: &[Turn]) {
        self.messages = turns.iter().map(to_chat_message).collect();
    }
}

fn to_chat_message(turn: &Turn) -> ChatMessage {
    let base = match turn.role {
        gridtalk_ai::ChatRole::User => ChatMessage::user(turn.content.text()),
        gridtalk_ai::ChatRole::Assistant => ChatMessage::assistant(turn.content.text()),
    };
    match &turn.content {
        TurnContent::Image { image, .. } => base.with_attachment(format!(
            "image attached ({}x{})",
            image.width(),
            image.height()
        )),
        TurnContent::Text { .. } => base,
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Interactive chat session state
struct ChatUi {
    turns: TurnLoop,
    view: TurnView,
    /// Transient lines shown after the conversation: the welcome text,
    /// upload notices, and failures surfaced in place of a reply. Cleared at
    /// the start of the next stimulus, which matches a full re-render.
    notices: Vec<ChatMessage>,
    input: InputBox,
    status: String,
    thinking: bool,
    spinner_start: Instant,
    scroll: usize,
    stick_to_bottom: bool,
    width: u16,
}

impl ChatUi {
    fn new(turns: TurnLoop) -> Self {
        Self {
            turns,
            view: TurnView::default(),
            notices: vec![ChatMessage::notice(WELCOME_TEXT)],
            input: InputBox::new().with_placeholder("Ask your question here..."),
            status: "Ready".to_string(),
            thinking: false,
            spinner_start: Instant::now(),
            scroll: 0,
            stick_to_bottom: true,
            width: 80,
        }
    }

    async fn handle(&mut self, action: Action, app: &mut App) -> anyhow::Result<Flow> {
        match action {
            Action::Submit => {
                let text = self.input.content().trim().to_string();
                if text.is_empty() {
                    return Ok(Flow::Continue);
                }
                self.input.clear();

                if let Some(command) = text.strip_prefix('/') {
                    return Ok(self.handle_command(command));
                }
                self.submit_prompt(text, app).await?;
                Ok(Flow::Continue)
            }
            Action::Interrupt | Action::Eof | Action::Escape => Ok(Flow::Quit),
            Action::PageUp => {
                self.stick_to_bottom = false;
                self.scroll = self.scroll.saturating_sub(10);
                Ok(Flow::Continue)
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                Ok(Flow::Continue)
            }
            other => {
                self.input.handle_action(&other, self.width);
                Ok(Flow::Continue)
            }
        }
    }

    fn handle_command(&mut self, command: &str) -> Flow {
        self.notices.clear();
        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };

        match name {
            "help" => self.notices.push(ChatMessage::notice(HELP_TEXT)),
            "quit" | "exit" => return Flow::Quit,
            "image" if arg.is_empty() => {
                if self.turns.has_pending_image() {
                    self.turns.remove_image(&mut self.view);
                    self.notices
                        .push(ChatMessage::notice("Pending image removed."));
                } else {
                    self.notices
                        .push(ChatMessage::notice("Usage: /image <path-to-image>"));
                }
            }
            "image" => match std::fs::read(arg) {
                Ok(bytes) => match self.turns.attach_image(&bytes, &mut self.view) {
                    Ok((w, h)) => self.notices.push(ChatMessage::notice(format!(
                        "Image attached ({}x{}). It will be sent with your next question.",
                        w, h
                    ))),
                    Err(e) => self
                        .notices
                        .push(ChatMessage::error(format!("Could not use that image: {}", e))),
                },
                Err(e) => self
                    .notices
                    .push(ChatMessage::error(format!("Could not read {}: {}", arg, e))),
            },
            _ => self
                .notices
                .push(ChatMessage::error(format!("Unknown command: /{}", name))),
        }
        self.stick_to_bottom = true;
        Flow::Continue
    }

    async fn submit_prompt(&mut self, text: String, app: &mut App) -> anyhow::Result<()> {
        // Echo the prompt and freeze the UI on a thinking frame; the loop
        // renders the real turns once the backend call resolves.
        self.notices.clear();
        self.notices.push(ChatMessage::user(&text));
        self.thinking = true;
        self.spinner_start = Instant::now();
        self.stick_to_bottom = true;
        app.draw(|frame, theme| self.draw_frame(frame, theme))?;

        let result = self.turns.submit(&text, &mut self.view).await;

        self.thinking = false;
        self.notices.clear();
        match result {
            Ok(_) => {
                self.status = "Ready".to_string();
            }
            Err(e) => {
                self.status = "Error".to_string();
                self.notices
                    .push(ChatMessage::error(format!("No reply: {}", e)));
            }
        }
        self.stick_to_bottom = true;
        Ok(())
    }

    fn draw_frame(&mut self, frame: &mut Frame, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Messages
                Constraint::Length(1), // Status
                Constraint::Length(3), // Input
            ])
            .split(frame.area());

        self.width = frame.area().width;

        // Messages, inside a titled border
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style())
            .title(" gridtalk │ power system analysis ");
        let inner = block.inner(chunks[0]);
        block.render(chunks[0], frame.buffer_mut());

        let mut display = self.view.messages.clone();
        display.extend(self.notices.iter().cloned());

        let height = content_height(&display, inner.width as usize);
        let max_scroll = height.saturating_sub(inner.height as usize);
        if self.stick_to_bottom || self.scroll > max_scroll {
            self.scroll = max_scroll;
        }

        MessageList::new(&display, theme)
            .scroll(self.scroll)
            .render(inner, frame.buffer_mut());

        // Status line
        if self.thinking {
            Spinner::new("Thinking...", theme, self.spinner_start)
                .render(chunks[1], frame.buffer_mut());
        } else {
            let mut spans = vec![Span::styled(self.status.clone(), theme.dim_style())];
            if let Some(pending) = self.turns.store().pending_image() {
                spans.push(Span::styled(
                    format!(
                        "  │  image pending ({}x{})",
                        pending.raw.width(),
                        pending.raw.height()
                    ),
                    theme.warning_style(),
                ));
            }
            Paragraph::new(Line::from(spans)).render(chunks[1], frame.buffer_mut());
        }

        // Input box
        self.input.render(chunks[2], frame.buffer_mut(), theme);
    }
}

/// Run the interactive session until the user exits
pub async fn run(turns: TurnLoop, theme: Theme) -> anyhow::Result<()> {
    let mut app = App::new()?.with_theme(theme);
    let mut state = ChatUi::new(turns);
    let mut events = EventStream::new();

    loop {
        app.draw(|frame, theme| state.draw_frame(frame, theme))?;

        let Some(event) = events.next().await else {
            break;
        };
        let Some(action) = event_to_action(event?) else {
            continue;
        };
        if let Flow::Quit = state.handle(action, &mut app).await? {
            break;
        }
    }

    Ok(())
}

//! Terminal lifecycle management

use crate::theme::Theme;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};

/// Owns the terminal for the lifetime of the interactive session. Raw mode
/// and the alternate screen are restored on drop, including on panic unwind.
pub struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    theme: Theme,
}

impl App {
    /// Take over the terminal
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            theme: Theme::default(),
        })
    }

    /// Set the color theme
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Get the theme
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Draw one frame
    pub fn draw(&mut self, render: impl FnOnce(&mut Frame, &Theme)) -> io::Result<()> {
        let theme = self.theme.clone();
        self.terminal.draw(|frame| render(frame, &theme))?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableBracketedPaste);
    }
}

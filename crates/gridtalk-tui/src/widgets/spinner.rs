//! Animated spinner widget

use crate::theme::Theme;
use ratatui::{buffer::Buffer, layout::Rect, text::Span, widgets::Widget};
use std::time::Instant;

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_MILLIS: u128 = 80;

/// Spinner with a label, animated from a shared start time so the frame is
/// stable across redraws within a tick.
pub struct Spinner<'a> {
    label: &'a str,
    theme: &'a Theme,
    started: Instant,
}

impl<'a> Spinner<'a> {
    /// Create a new spinner
    pub fn new(label: &'a str, theme: &'a Theme, started: Instant) -> Self {
        Self {
            label,
            theme,
            started,
        }
    }

    fn frame(&self) -> &'static str {
        let index = (self.started.elapsed().as_millis() / FRAME_MILLIS) as usize;
        FRAMES[index % FRAMES.len()]
    }
}

impl Widget for Spinner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 {
            return;
        }
        let text = format!("{} {}", self.frame(), self.label);
        let span = Span::styled(&text, self.theme.warning_style());
        buf.set_span(area.x, area.y, &span, area.width);
    }
}

//! Message list widget for displaying the conversation

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Who a displayed message is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
    /// Informational lines from the front-end itself (help text, upload
    /// notices, surfaced errors)
    Notice,
}

/// A single message in the chat display
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub speaker: Speaker,
    /// Message text
    pub content: String,
    /// Extra line shown under the text, e.g. an image-attachment marker
    pub attachment: Option<String>,
    /// Whether this is an error message
    pub is_error: bool,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: content.into(),
            attachment: None,
            is_error: false,
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            content: content.into(),
            attachment: None,
            is_error: false,
        }
    }

    /// Create an informational notice
    pub fn notice(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Notice,
            content: content.into(),
            attachment: None,
            is_error: false,
        }
    }

    /// Create an error notice
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Notice,
            content: content.into(),
            attachment: None,
            is_error: true,
        }
    }

    /// Attach a marker line, e.g. "image attached (640x480)"
    pub fn with_attachment(mut self, label: impl Into<String>) -> Self {
        self.attachment = Some(label.into());
        self
    }
}

/// Widget rendering the full ordered message list with a scroll offset
pub struct MessageList<'a> {
    messages: &'a [ChatMessage],
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> MessageList<'a> {
    /// Create a new message list
    pub fn new(messages: &'a [ChatMessage], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            scroll: 0,
        }
    }

    /// Set scroll offset (in lines)
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    fn message_lines(&self, msg: &ChatMessage, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let (header, header_style) = match msg.speaker {
            Speaker::User => ("▶ You", self.theme.accent_bold()),
            Speaker::Assistant => (
                "◀ Assistant",
                self.theme
                    .success_style()
                    .add_modifier(ratatui::style::Modifier::BOLD),
            ),
            Speaker::Notice => ("● gridtalk", self.theme.dim_style()),
        };
        lines.push(Line::from(Span::styled(header, header_style)));

        let content_style = if msg.is_error {
            self.theme.error_style()
        } else if msg.speaker == Speaker::Notice {
            self.theme.dim_style()
        } else {
            self.theme.base_style()
        };

        let content_width = width.saturating_sub(2).max(1);
        for wrapped in textwrap::wrap(&msg.content, content_width) {
            lines.push(Line::from(Span::styled(
                format!("  {}", wrapped),
                content_style,
            )));
        }

        if let Some(ref label) = msg.attachment {
            lines.push(Line::from(Span::styled(
                format!("  ▣ {}", label),
                self.theme.dim_style(),
            )));
        }

        // Blank separator between messages
        lines.push(Line::from(""));
        lines
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let mut all_lines: Vec<Line> = Vec::new();
        for msg in self.messages {
            all_lines.extend(self.message_lines(msg, width));
        }

        let visible: Vec<Line> = all_lines
            .into_iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible).render(area, buf);
    }
}

/// Total rendered height of the message list at a given width, for scroll
/// clamping. Must stay in step with the rendering logic above.
pub fn content_height(messages: &[ChatMessage], width: usize) -> usize {
    let content_width = width.saturating_sub(2).max(1);
    messages
        .iter()
        .map(|msg| {
            let body = textwrap::wrap(&msg.content, content_width).len();
            let attachment = usize::from(msg.attachment.is_some());
            // header + body + attachment + separator
            1 + body + attachment + 1
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_height_counts_wrapping_and_attachments() {
        let messages = vec![
            ChatMessage::user("short"),
            ChatMessage::user("a question about this diagram").with_attachment("image (2x2)"),
        ];
        // width 80: one body line each; second message has an extra marker
        assert_eq!(content_height(&messages, 80), 3 + 4);
    }

    #[test]
    fn test_content_height_on_narrow_area() {
        let messages = vec![ChatMessage::assistant("four words wrap here")];
        let wide = content_height(&messages, 80);
        let narrow = content_height(&messages, 8);
        assert!(narrow > wide);
    }
}

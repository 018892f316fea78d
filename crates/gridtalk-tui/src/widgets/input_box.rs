//! Single-line text input widget

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Single-line text input with cursor editing and horizontal scrolling.
/// The cursor is a byte offset, always kept on a char boundary.
#[derive(Debug, Default)]
pub struct InputBox {
    text: String,
    cursor: usize,
    /// Horizontal scroll offset in display columns
    scroll: usize,
    placeholder: String,
}

impl InputBox {
    /// Create a new input box
    pub fn new() -> Self {
        Self::default()
    }

    /// Set placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Get the current content
    pub fn content(&self) -> &str {
        &self.text
    }

    /// Clear the content
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    /// Byte offset of the char before the cursor, if any
    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
    }

    /// Byte offset just past the char at the cursor, if any
    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }

    /// Display width of everything before the cursor
    fn cursor_column(&self) -> usize {
        self.text[..self.cursor].width()
    }

    fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Handle an editing action; returns true if it was consumed
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        let consumed = match action {
            Action::Char(c) => {
                self.insert(*c);
                true
            }
            Action::Backspace => match self.prev_boundary() {
                Some(start) => {
                    self.text.remove(start);
                    self.cursor = start;
                    true
                }
                None => false,
            },
            Action::Delete => {
                if self.cursor < self.text.len() {
                    self.text.remove(self.cursor);
                    true
                } else {
                    false
                }
            }
            Action::Left => match self.prev_boundary() {
                Some(start) => {
                    self.cursor = start;
                    true
                }
                None => false,
            },
            Action::Right => match self.next_boundary() {
                Some(end) => {
                    self.cursor = end;
                    true
                }
                None => false,
            },
            Action::Home => {
                self.cursor = 0;
                true
            }
            Action::End => {
                self.cursor = self.text.len();
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord => {
                let mut start = self.cursor;
                // skip spaces, then the word before them
                while let Some((i, c)) = self.text[..start].char_indices().last() {
                    if c != ' ' {
                        break;
                    }
                    start = i;
                }
                while let Some((i, c)) = self.text[..start].char_indices().last() {
                    if c == ' ' {
                        break;
                    }
                    start = i;
                }
                self.text.drain(start..self.cursor);
                self.cursor = start;
                true
            }
            Action::Paste(pasted) => {
                // collapse newlines to single spaces for single-line input
                let mut last_was_space = false;
                for c in pasted.chars() {
                    if c == '\n' || c == '\r' {
                        if !last_was_space {
                            self.insert(' ');
                            last_was_space = true;
                        }
                    } else {
                        self.insert(c);
                        last_was_space = c == ' ';
                    }
                }
                true
            }
            _ => false,
        };

        if consumed {
            self.update_scroll(width as usize);
        }
        consumed
    }

    fn update_scroll(&mut self, width: usize) {
        let visible = width.saturating_sub(4).max(1);
        let column = self.cursor_column();
        if column < self.scroll {
            self.scroll = column;
        } else if column >= self.scroll + visible {
            self.scroll = column - visible + 1;
        }
    }

    /// Render the input box with its border and cursor
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.accent_style());
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 {
            return;
        }

        let (display, style) = if self.text.is_empty() {
            (self.placeholder.clone(), theme.dim_style())
        } else {
            (self.visible_slice(inner.width as usize), theme.base_style())
        };
        Paragraph::new(display).style(style).render(inner, buf);

        let cursor_x = self.cursor_column().saturating_sub(self.scroll);
        if cursor_x < inner.width as usize {
            let pos = (inner.x + cursor_x as u16, inner.y);
            if let Some(cell) = buf.cell_mut(pos) {
                cell.set_style(Style::default().bg(theme.accent));
            }
        }
    }

    /// The part of the text visible at the current scroll offset
    fn visible_slice(&self, width: usize) -> String {
        let mut out = String::new();
        let mut column = 0;
        for c in self.text.chars() {
            let w = c.width().unwrap_or(0);
            if column + w > self.scroll + width {
                break;
            }
            if column >= self.scroll {
                out.push(c);
            }
            column += w;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in s.chars() {
            input.handle_action(&Action::Char(c), 80);
        }
        input
    }

    #[test]
    fn test_typing_appends_at_cursor() {
        let input = typed("hello");
        assert_eq!(input.content(), "hello");
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut input = InputBox::new();
        assert!(!input.handle_action(&Action::Backspace, 80));

        let mut input = typed("ab");
        input.handle_action(&Action::Home, 80);
        assert!(!input.handle_action(&Action::Backspace, 80));
        assert_eq!(input.content(), "ab");
    }

    #[test]
    fn test_edit_in_the_middle() {
        let mut input = typed("bus 14");
        input.handle_action(&Action::Left, 80);
        input.handle_action(&Action::Left, 80);
        input.handle_action(&Action::Char('x'), 80);
        assert_eq!(input.content(), "bus x14");
    }

    #[test]
    fn test_multibyte_chars_stay_on_boundaries() {
        let mut input = typed("Ω=5");
        input.handle_action(&Action::Left, 80);
        input.handle_action(&Action::Left, 80);
        input.handle_action(&Action::Backspace, 80);
        assert_eq!(input.content(), "=5");
        input.handle_action(&Action::Char('θ'), 80);
        assert_eq!(input.content(), "θ=5");
    }

    #[test]
    fn test_delete_word_takes_trailing_spaces_and_word() {
        let mut input = typed("power flow  ");
        input.handle_action(&Action::DeleteWord, 80);
        assert_eq!(input.content(), "power ");
        input.handle_action(&Action::DeleteWord, 80);
        assert_eq!(input.content(), "");
    }

    #[test]
    fn test_paste_collapses_newlines() {
        let mut input = InputBox::new();
        input.handle_action(&Action::Paste("yBus = [1\r\n2\n3]".to_string()), 80);
        assert_eq!(input.content(), "yBus = [1 2 3]");
    }

    #[test]
    fn test_clear_line() {
        let mut input = typed("anything");
        input.handle_action(&Action::ClearLine, 80);
        assert_eq!(input.content(), "");
    }
}

//! # CommandLine Component
//!
//! The bottom row: what the user is typing in the active tab. When the
//! buffer is longer than the row, only its tail is shown so the cursor
//! stays on screen.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;

use crate::tui::component::Component;

pub struct CommandLine<'a> {
    pub buffer: &'a str,
}

impl<'a> CommandLine<'a> {
    pub fn new(buffer: &'a str) -> Self {
        Self { buffer }
    }
}

/// The longest suffix of `buffer` that fits in `width - 1` columns. The
/// last column is kept free for the cursor.
pub fn visible_tail(buffer: &str, width: usize) -> &str {
    let budget = width.saturating_sub(1);
    let mut used = 0;
    let mut start = buffer.len();
    for (i, c) in buffer.char_indices().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        start = i;
    }
    &buffer[start..]
}

impl Component for CommandLine<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let tail = visible_tail(self.buffer, area.width as usize);
        let columns: usize = tail.chars().map(|c| c.width().unwrap_or(0)).sum();
        frame.render_widget(Span::raw(tail), area);
        frame.set_cursor_position((area.x + columns as u16, area.y));
    }
}

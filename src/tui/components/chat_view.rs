//! # ChatView Component
//!
//! The bordered window showing the active tab's log. Wrapping is done by
//! `core::reflow` against the inner area, so a resize reflows on the next
//! frame with no cached layout to invalidate.

use log::warn;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::core::reflow::reflow;
use crate::core::tab::LogEntry;
use crate::tui::component::Component;
use crate::tui::ui::attr_style;

pub struct ChatView<'a> {
    pub log: &'a [LogEntry],
}

impl<'a> ChatView<'a> {
    pub fn new(log: &'a [LogEntry]) -> Self {
        Self { log }
    }
}

impl Component for ChatView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered();
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let width = inner.width as usize;
        let lines: Vec<Line> = reflow(self.log, width, inner.height as usize)
            .into_iter()
            .filter_map(|row| {
                // Double-width glyphs can still overflow the window; later rows move up
                if row.text.width() > width {
                    warn!("Skipping row wider than chat window: {:?}", row.text);
                    return None;
                }
                Some(Line::from(Span::styled(row.text, attr_style(row.attr))))
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

//! # TabBar Component
//!
//! The single top row listing every open tab. The core decides which
//! characters are visible and how each one is styled; this component only
//! groups equal-styled runs into spans.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};

use crate::core::state::Session;
use crate::core::tab_bar::layout;
use crate::tui::component::Component;
use crate::tui::ui::attr_style;

pub struct TabBar<'a> {
    pub titles: Vec<&'a str>,
    pub selected: usize,
    pub notify: Vec<bool>,
}

impl<'a> TabBar<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            titles: session.tabs().iter().map(|t| t.title.as_str()).collect(),
            selected: session.active_index(),
            notify: session.tabs().iter().map(|t| t.is_notified()).collect(),
        }
    }
}

impl Component for TabBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let bar = layout(&self.titles, self.selected, &self.notify, area.width as usize);

        let mut spans: Vec<Span> = Vec::new();
        let mut run = String::new();
        let mut run_attr = None;
        for (c, attr) in bar.cells() {
            if let Some(current) = run_attr
                && current != attr
            {
                spans.push(Span::styled(std::mem::take(&mut run), attr_style(current)));
            }
            run_attr = Some(attr);
            run.push(c);
        }
        if let Some(attr) = run_attr {
            spans.push(Span::styled(run, attr_style(attr)));
        }

        frame.render_widget(Line::from(spans), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_session, thread};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::style::Modifier;

    fn draw(session: &Session, width: u16) -> ratatui::buffer::Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, 1)).unwrap();
        terminal
            .draw(|f| TabBar::new(session).render(f, f.area()))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn row_text(buffer: &ratatui::buffer::Buffer) -> String {
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_selected_tab_is_plain_others_reversed() {
        let mut session = test_session();
        session.go_to_thread(thread("a", "Alice", false));
        session.go_to_tab(0);

        let buffer = draw(&session, 30);
        assert!(row_text(&buffer).starts_with(" Messenger  Alice "));

        // " Messenger " is selected, " Alice " is not
        assert!(!buffer[(1, 0)].modifier.contains(Modifier::REVERSED));
        assert!(buffer[(12, 0)].modifier.contains(Modifier::REVERSED));
        // Padding past the last tab is reversed too
        assert!(buffer[(29, 0)].modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn test_notified_tab_is_bold() {
        let mut session = test_session();
        session.go_to_thread(thread("a", "Alice", false));
        session.go_to_tab(0);
        session.notify_tab(1);

        let buffer = draw(&session, 30);
        assert!(buffer[(12, 0)].modifier.contains(Modifier::BOLD));
        assert!(!buffer[(1, 0)].modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_narrow_terminal_centers_selected_tab() {
        let mut session = test_session();
        session.go_to_thread(thread("a", "Alice", false));
        session.go_to_thread(thread("b", "Bob", false));
        session.go_to_tab(1);

        let buffer = draw(&session, 12);
        assert_eq!(row_text(&buffer), "er  Alice  B");
    }
}

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Modifier, Style};

use crate::core::state::Session;
use crate::core::style::Attr;
use crate::tui::component::Component;
use crate::tui::components::{ChatView, CommandLine, TabBar};

/// Map a core display attribute onto a ratatui style.
pub fn attr_style(attr: Attr) -> Style {
    let mut style = Style::default();
    if attr.contains(Attr::REVERSE) {
        style = style.add_modifier(Modifier::REVERSED);
    }
    if attr.contains(Attr::BOLD) {
        style = style.add_modifier(Modifier::BOLD);
    }
    style
}

/// Tab bar on top, chat window in the middle, command line at the bottom.
pub fn draw_ui(frame: &mut Frame, session: &Session) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Min(0), Length(1)]);
    let [tab_area, chat_area, command_area] = layout.areas(frame.area());

    let active = session.active_tab();
    TabBar::new(session).render(frame, tab_area);
    ChatView::new(active.log()).render(frame, chat_area);
    CommandLine::new(&active.command_buffer).render(frame, command_area);
}

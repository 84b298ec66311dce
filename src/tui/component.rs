use ratatui::layout::Rect;
use ratatui::Frame;

/// A reusable UI component.
///
/// Components receive data via props (struct fields) borrowed from the
/// `Session` for the duration of one frame, and render into a `Rect`.
/// They hold no state of their own: everything they show is recomputed
/// from the session on every draw.
pub trait Component {
    /// Render the component into the given area.
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

//! # Tab Bar Layout
//!
//! Computes what the single-row tab bar shows for a given terminal width.
//!
//! Every tab renders as `" " + title + " "`. The selected tab is drawn
//! NORMAL, the rest REVERSE, and a tab with pending notifications gets BOLD
//! on top. When the full bar is wider than the terminal, a window of exactly
//! `width` columns is cut out of it, centered on the selected tab:
//!
//! ```text
//! full:   " Messenger  Alice  Bob "      width 12, selected = Alice
//!                  [er  Alice  B]
//! ```
//!
//! The window start is clamped so the selected tab's first column is never
//! left of the window, then pulled back so the window never runs past the end
//! of the bar. Nothing is remembered between frames.
//!
//! Positions are terminal columns, so a CJK or emoji title takes two cells
//! per glyph. A wide glyph cut in half by either window edge shows as a blank.

use unicode_width::UnicodeWidthChar;

use crate::core::style::Attr;

/// The visible slice of the tab bar plus one attribute per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabBarLayout {
    /// Exactly `width` columns wide.
    pub visible: String,
    pub styles: Vec<Attr>,
    /// Column offset of the window into the full bar.
    pub offset: usize,
}

impl TabBarLayout {
    /// Iterate `(char, attr)` pairs. Each char takes the attr of its first
    /// column.
    pub fn cells(&self) -> impl Iterator<Item = (char, Attr)> + '_ {
        let mut column = 0;
        self.visible.chars().map(move |c| {
            let attr = self.styles.get(column).copied().unwrap_or(Attr::REVERSE);
            column += cell_width(c);
            (c, attr)
        })
    }
}

/// Columns `c` occupies in the bar. Zero-width and control chars still get one.
fn cell_width(c: char) -> usize {
    c.width().unwrap_or(1).max(1)
}

/// Lay out `titles` into a bar of exactly `width` columns.
///
/// `notify` is indexed like `titles`; missing entries count as `false`.
pub fn layout(titles: &[&str], selected: usize, notify: &[bool], width: usize) -> TabBarLayout {
    // `None` marks the trailing column of a wide glyph
    let mut bar: Vec<Option<char>> = Vec::new();
    let mut styles: Vec<Attr> = Vec::new();
    let mut selected_start = 0usize;
    let mut selected_len = 0usize;

    for (i, title) in titles.iter().enumerate() {
        let mut attr = if i == selected {
            selected_start = bar.len();
            Attr::NORMAL
        } else {
            Attr::REVERSE
        };
        if notify.get(i).copied().unwrap_or(false) {
            attr |= Attr::BOLD;
        }

        let before = bar.len();
        bar.push(Some(' '));
        for c in title.chars() {
            bar.push(Some(c));
            bar.extend(std::iter::repeat_n(None, cell_width(c) - 1));
        }
        bar.push(Some(' '));
        styles.resize(bar.len(), attr);
        if i == selected {
            selected_len = bar.len() - before;
        }
    }

    let offset = if bar.len() > width {
        window_start(bar.len(), selected_start, selected_len, width)
    } else {
        bar.resize(width, Some(' '));
        styles.resize(width, Attr::REVERSE);
        0
    };

    let mut window = bar[offset..offset + width].to_vec();
    if let Some(first) = window.first_mut()
        && first.is_none()
    {
        *first = Some(' ');
    }
    if let Some(last) = window.last_mut()
        && last.is_some_and(|c| cell_width(c) > 1)
    {
        *last = Some(' ');
    }

    TabBarLayout {
        visible: window.into_iter().flatten().collect(),
        styles: styles[offset..offset + width].to_vec(),
        offset,
    }
}

/// Start of a `width`-wide window over a bar of `bar_len` columns.
/// Requires `bar_len > width`.
fn window_start(bar_len: usize, selected_start: usize, selected_len: usize, width: usize) -> usize {
    let middle = selected_start + selected_len / 2;
    let start = middle.saturating_sub(width / 2).min(selected_start);
    start.min(bar_len - width)
}

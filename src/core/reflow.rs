//! # Text Reflow
//!
//! Turns a tab's log into the lines that fit the chat viewport.
//!
//! ```text
//! log: [("hello world foo", NORMAL)]   width 5, height 10
//!                     │
//!                     ▼
//! ["hello", "world", "foo"]            (bottom-anchored)
//! ```
//!
//! Every entry is split on embedded newlines, each sub-line is greedily
//! word-wrapped, and only the last `height` lines survive. Older content
//! scrolls off the top; there is no scroll-back.
//!
//! Reflow keeps no state between calls. The chat view calls it on every
//! frame, so a resize or a new message is picked up for free.

use crate::core::style::Attr;
use crate::core::tab::LogEntry;

/// One visual row of the chat viewport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedLine {
    pub text: String,
    pub attr: Attr,
}

impl WrappedLine {
    fn blank(attr: Attr) -> Self {
        Self {
            text: String::new(),
            attr,
        }
    }
}

/// Textwrap options for the chat viewport: greedy, ASCII-space separated,
/// words longer than the line are broken.
fn wrap_options(width: usize) -> textwrap::Options<'static> {
    textwrap::Options::new(width)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Wrap a single entry into rows. Empty sub-lines stay as blank rows so
/// spacing in the welcome text and in multi-paragraph messages survives.
fn wrap_entry(entry: &LogEntry, width: usize) -> Vec<WrappedLine> {
    let mut rows = Vec::new();
    if entry.text.is_empty() {
        rows.push(WrappedLine::blank(entry.attr));
        return rows;
    }

    for sub_line in entry.text.lines() {
        if sub_line.is_empty() {
            rows.push(WrappedLine::blank(entry.attr));
            continue;
        }
        let wrapped = textwrap::wrap(sub_line, wrap_options(width));
        if wrapped.is_empty() {
            rows.push(WrappedLine::blank(entry.attr));
            continue;
        }
        rows.extend(wrapped.into_iter().map(|part| WrappedLine {
            text: part.into_owned(),
            attr: entry.attr,
        }));
    }
    rows
}

/// Compute the bottom-anchored visible rows for `log` in a `width` x `height`
/// viewport. Never returns more than `height` rows.
pub fn reflow(log: &[LogEntry], width: usize, height: usize) -> Vec<WrappedLine> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    // Walk newest-first and stop once the viewport is full; entries further
    // back could only be scrolled off anyway.
    let mut chunks = Vec::new();
    let mut produced = 0usize;
    for entry in log.iter().rev() {
        let rows = wrap_entry(entry, width);
        produced += rows.len();
        chunks.push(rows);
        if produced >= height {
            break;
        }
    }

    let mut lines: Vec<WrappedLine> = chunks.into_iter().rev().flatten().collect();
    let excess = lines.len().saturating_sub(height);
    lines.drain(..excess);
    lines
}

//! Display attributes attached to log entries and tab bar cells.
//!
//! `Attr` is a small bitmask so the core can describe "bold" or "reverse"
//! without knowing anything about ratatui. The TUI adapter maps it onto a
//! real `Style` at draw time.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attr(u8);

impl Attr {
    pub const NORMAL: Attr = Attr(0);
    pub const REVERSE: Attr = Attr(1);
    pub const BOLD: Attr = Attr(1 << 1);

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if every bit set in `other` is also set in `self`.
    pub const fn contains(self, other: Attr) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_normal(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Attr {
    type Output = Attr;

    fn bitor(self, rhs: Attr) -> Attr {
        Attr(self.0 | rhs.0)
    }
}

impl BitOrAssign for Attr {
    fn bitor_assign(&mut self, rhs: Attr) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_normal() {
            return write!(f, "NORMAL");
        }
        let mut names = Vec::new();
        if self.contains(Attr::REVERSE) {
            names.push("REVERSE");
        }
        if self.contains(Attr::BOLD) {
            names.push("BOLD");
        }
        write!(f, "{}", names.join(" | "))
    }
}

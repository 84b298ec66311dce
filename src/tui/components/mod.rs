//! # TUI Components
//!
//! All three components are stateless: they borrow what they show from the
//! `Session` and are rebuilt on every frame.
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── tab_bar.rs       (top row, one entry per tab)
//! ├── chat_view.rs     (bordered log of the active tab)
//! └── command_line.rs  (bottom row, the active tab's buffer)
//! ```
//!
//! Layout math (wrapping, tab bar windowing) lives in `core` so it can be
//! tested without a terminal. Components only turn its output into spans.

pub mod chat_view;
pub mod command_line;
pub mod tab_bar;

pub use chat_view::ChatView;
pub use command_line::CommandLine;
pub use tab_bar::TabBar;

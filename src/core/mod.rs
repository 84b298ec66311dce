//! # Core Client Logic
//!
//! Tabs, routing and text layout. Nothing in here knows about the terminal
//! or the network.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Session (tabs)       │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • reflow / tab bar     │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Vec<Effect>
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │ ── Action (channel) ───▶ │ messaging  │
//!     │  Adapter   │ ◀── results ──────────── │  client    │
//!     │ (ratatui)  │                          │  (reqwest) │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: `Session`, the tab collection and routing rules
//! - [`tab`]: one tab's log, buffer and command handling
//! - [`action`]: the `Action` enum and the `update()` reducer
//! - [`reflow`] and [`tab_bar`]: pure layout functions
//! - [`config`] and [`session`]: settings file and saved login

pub mod action;
pub mod config;
pub mod format;
pub mod reflow;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod style;
pub mod tab;
pub mod tab_bar;

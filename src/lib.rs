//! termchat library exports for testing

pub mod core;
pub mod login;
pub mod messaging;
pub mod tui;

#[cfg(test)]
pub mod test_support;

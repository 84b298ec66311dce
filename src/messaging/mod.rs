//! # Messaging Backend
//!
//! Everything that talks to the chat service lives here: the
//! `MessagingClient` trait the rest of the app depends on, the wire types,
//! an HTTP implementation, and the author-name cache.

pub mod client;
pub mod directory;
pub mod http;
pub mod types;

pub use client::{MessagingClient, MessagingError};
pub use directory::UserDirectory;
pub use http::HttpMessenger;
pub use types::{
    Attachment, AuthSession, Credentials, InboundMessage, Message, SessionToken, Sticker, Thread,
    UserInfo,
};

use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use super::types::{AuthSession, Credentials, InboundMessage, Message, SessionToken, Thread, UserInfo};

/// Errors reported by a messaging backend.
#[derive(Debug)]
pub enum MessagingError {
    /// Credentials rejected. Login re-prompts.
    Auth(String),
    /// Saved session token no longer valid. Login falls back to credentials.
    InvalidSession(String),
    /// Call made before a session was established.
    NotLoggedIn,
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// Service returned an error response.
    Api { status: u16, message: String },
    /// Failed to parse the service's response.
    Parse(String),
    /// The mpsc channel was closed (TUI dropped the receiver).
    ChannelClosed,
}

impl fmt::Display for MessagingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessagingError::Auth(msg) => write!(f, "authentication failed: {msg}"),
            MessagingError::InvalidSession(msg) => write!(f, "invalid session: {msg}"),
            MessagingError::NotLoggedIn => write!(f, "not logged in"),
            MessagingError::Network(msg) => write!(f, "network error: {msg}"),
            MessagingError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            MessagingError::Parse(msg) => write!(f, "parse error: {msg}"),
            MessagingError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for MessagingError {}

/// The chat service the client talks to.
///
/// Implementations hold their own session state: after `authenticate` or
/// `restore_session` succeeds, the remaining calls act as that user.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Returns the name of the backend (for logs).
    fn name(&self) -> &str;

    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthSession, MessagingError>;

    async fn restore_session(&self, token: &SessionToken) -> Result<AuthSession, MessagingError>;

    async fn fetch_user_info(&self, user_id: &str) -> Result<UserInfo, MessagingError>;

    async fn fetch_thread_list(&self, limit: usize) -> Result<Vec<Thread>, MessagingError>;

    /// Most recent messages of a thread, newest first.
    async fn fetch_thread_messages(
        &self,
        thread_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, MessagingError>;

    async fn search_threads(&self, query: &str) -> Result<Vec<Thread>, MessagingError>;

    async fn send_message(&self, text: &str, thread_id: &str) -> Result<(), MessagingError>;

    async fn mark_as_read(&self, thread_id: &str) -> Result<(), MessagingError>;

    async fn mark_as_delivered(&self, thread_id: &str, message_id: &str)
    -> Result<(), MessagingError>;

    async fn logout(&self) -> Result<(), MessagingError>;

    /// Streams inbound messages into `sender` until the connection ends.
    async fn listen(&self, sender: Sender<InboundMessage>) -> Result<(), MessagingError>;
}

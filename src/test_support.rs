//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::core::state::{Session, Viewport};
use crate::messaging::{
    AuthSession, Credentials, InboundMessage, Message, MessagingClient, MessagingError,
    SessionToken, Thread, UserInfo,
};

#[derive(Default)]
struct FakeState {
    users: HashMap<String, UserInfo>,
    threads: Vec<Thread>,
    messages: HashMap<String, Vec<Message>>,
    search_results: HashMap<String, Vec<Thread>>,
    inbound: Vec<InboundMessage>,
    password: String,
    valid_token: Option<String>,
    fail_sends: bool,
    calls: Vec<String>,
    sent: Vec<(String, String)>,
}

/// In-memory messaging backend that records every call.
pub struct FakeMessenger {
    state: Mutex<FakeState>,
}

impl FakeMessenger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                password: "hunter2".to_string(),
                ..Default::default()
            }),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut guard = self.state.lock().unwrap();
        f(&mut guard)
    }

    fn record(&self, call: &str) {
        self.with(|s| s.calls.push(call.to_string()));
    }

    pub fn add_user(&self, id: &str, name: &str) {
        self.with(|s| {
            s.users.insert(
                id.to_string(),
                UserInfo {
                    id: id.to_string(),
                    name: name.to_string(),
                    first_name: None,
                },
            )
        });
    }

    pub fn add_thread(&self, id: &str, name: &str, unread: bool) {
        self.with(|s| s.threads.push(thread(id, name, unread)));
    }

    /// Messages are stored newest first, like the real service returns them.
    pub fn add_message(&self, thread_id: &str, id: &str, author_id: &str, text: &str) {
        self.with(|s| {
            s.messages
                .entry(thread_id.to_string())
                .or_default()
                .insert(0, text_message(id, author_id, text))
        });
    }

    pub fn set_search_results(&self, query: &str, threads: Vec<Thread>) {
        self.with(|s| s.search_results.insert(query.to_string(), threads));
    }

    pub fn set_valid_token(&self, token: &str) {
        self.with(|s| s.valid_token = Some(token.to_string()));
    }

    pub fn push_inbound(&self, inbound: InboundMessage) {
        self.with(|s| s.inbound.push(inbound));
    }

    pub fn fail_sends(&self) {
        self.with(|s| s.fail_sends = true);
    }

    pub fn calls_to(&self, name: &str) -> usize {
        self.with(|s| s.calls.iter().filter(|c| c.as_str() == name).count())
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.with(|s| s.sent.clone())
    }
}

#[async_trait]
impl MessagingClient for FakeMessenger {
    fn name(&self) -> &str {
        "fake"
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthSession, MessagingError> {
        self.record("authenticate");
        self.with(|s| {
            if credentials.password == s.password {
                Ok(AuthSession {
                    token: SessionToken("fresh-token".into()),
                    user_id: "me".into(),
                })
            } else {
                Err(MessagingError::Auth("bad password".into()))
            }
        })
    }

    async fn restore_session(&self, token: &SessionToken) -> Result<AuthSession, MessagingError> {
        self.record("restore_session");
        self.with(|s| match &s.valid_token {
            Some(valid) if valid == token.as_str() => Ok(AuthSession {
                token: token.clone(),
                user_id: "me".into(),
            }),
            _ => Err(MessagingError::InvalidSession("expired".into())),
        })
    }

    async fn fetch_user_info(&self, user_id: &str) -> Result<UserInfo, MessagingError> {
        self.record("fetch_user_info");
        self.with(|s| {
            s.users.get(user_id).cloned().ok_or(MessagingError::Api {
                status: 404,
                message: format!("no user {user_id}"),
            })
        })
    }

    async fn fetch_thread_list(&self, limit: usize) -> Result<Vec<Thread>, MessagingError> {
        self.record("fetch_thread_list");
        self.with(|s| Ok(s.threads.iter().take(limit).cloned().collect()))
    }

    async fn fetch_thread_messages(
        &self,
        thread_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, MessagingError> {
        self.record("fetch_thread_messages");
        self.with(|s| {
            Ok(s.messages
                .get(thread_id)
                .map(|m| m.iter().take(limit).cloned().collect())
                .unwrap_or_default())
        })
    }

    async fn search_threads(&self, query: &str) -> Result<Vec<Thread>, MessagingError> {
        self.record("search_threads");
        self.with(|s| Ok(s.search_results.get(query).cloned().unwrap_or_default()))
    }

    async fn send_message(&self, text: &str, thread_id: &str) -> Result<(), MessagingError> {
        self.record("send_message");
        self.with(|s| {
            if s.fail_sends {
                return Err(MessagingError::Network("connection refused".into()));
            }
            s.sent.push((thread_id.to_string(), text.to_string()));
            Ok(())
        })
    }

    async fn mark_as_read(&self, _thread_id: &str) -> Result<(), MessagingError> {
        self.record("mark_as_read");
        Ok(())
    }

    async fn mark_as_delivered(
        &self,
        _thread_id: &str,
        _message_id: &str,
    ) -> Result<(), MessagingError> {
        self.record("mark_as_delivered");
        Ok(())
    }

    async fn logout(&self) -> Result<(), MessagingError> {
        self.record("logout");
        Ok(())
    }

    async fn listen(&self, sender: Sender<InboundMessage>) -> Result<(), MessagingError> {
        self.record("listen");
        let inbound = self.with(|s| std::mem::take(&mut s.inbound));
        for message in inbound {
            sender
                .send(message)
                .await
                .map_err(|_| MessagingError::ChannelClosed)?;
        }
        Ok(())
    }
}

pub fn thread(id: &str, name: &str, unread: bool) -> Thread {
    Thread {
        id: id.to_string(),
        name: name.to_string(),
        unread,
    }
}

pub fn text_message(id: &str, author_id: &str, text: &str) -> Message {
    Message {
        id: id.to_string(),
        author_id: author_id.to_string(),
        text: Some(text.to_string()),
        sticker: None,
        attachments: Vec::new(),
        is_read: false,
    }
}

pub fn me() -> UserInfo {
    UserInfo {
        id: "me".into(),
        name: "Felix Guo".into(),
        first_name: Some("Felix".into()),
    }
}

/// Creates a test Session with an 80x24 terminal.
pub fn test_session() -> Session {
    Session::new("Messenger", me(), Viewport::new(80, 24), 10)
}

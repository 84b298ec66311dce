use serde::{Deserialize, Serialize};

/// A conversation on the messaging service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub id: String,
    pub name: String,
    /// True when the latest message in the thread hasn't been read yet.
    #[serde(default)]
    pub unread: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub first_name: Option<String>,
}

impl UserInfo {
    /// Short name used as the author prefix of messages.
    pub fn display_first_name(&self) -> &str {
        match self.first_name.as_deref() {
            Some(first) if !first.is_empty() => first,
            _ => self.name.split_whitespace().next().unwrap_or(&self.name),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Sticker {
    pub url: String,
}

/// Non-text payload of a message.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Attachment {
    Image { url: String },
    Video,
    #[serde(other)]
    Other,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub author_id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub sticker: Option<Sticker>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub is_read: bool,
}

/// A message pushed by the service's event stream.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub author_id: String,
    pub thread_id: String,
    pub message: Message,
}

#[derive(Serialize, Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Opaque token identifying a logged-in session, safe to persist.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result of a successful login or session restore.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: SessionToken,
    pub user_id: String,
}

//! JSON-over-HTTP messaging backend.
//!
//! Endpoints, relative to the configured server URL:
//!
//! ```text
//! POST /auth/login                          Credentials  -> AuthSession
//! GET  /auth/session                        (bearer)     -> AuthSession
//! POST /auth/logout
//! GET  /users/{id}                                       -> UserInfo
//! GET  /threads?limit=N                                  -> [Thread]
//! GET  /threads/{id}/messages?limit=N                    -> [Message] (newest first)
//! GET  /search/threads?q=QUERY                           -> [Thread]
//! POST /threads/{id}/messages               {text, client_id}
//! POST /threads/{id}/read
//! POST /threads/{id}/messages/{mid}/delivered
//! GET  /events                              SSE, `event: message` + InboundMessage JSON
//! ```
//!
//! Every call except login carries `Authorization: Bearer <token>`.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc::Sender;

use super::client::{MessagingClient, MessagingError};
use super::types::{AuthSession, Credentials, InboundMessage, Message, SessionToken, Thread, UserInfo};

#[derive(Serialize, Debug)]
struct SendRequest<'a> {
    text: &'a str,
    /// Idempotency key so a retried POST doesn't post twice.
    client_id: String,
}

pub struct HttpMessenger {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
    session: RwLock<Option<AuthSession>>,
}

impl HttpMessenger {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
            timeout,
            session: RwLock::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token(&self) -> Result<String, MessagingError> {
        let guard = self.session.read().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .map(|s| s.token.as_str().to_string())
            .ok_or(MessagingError::NotLoggedIn)
    }

    fn store_session(&self, session: &AuthSession) {
        let mut guard = self.session.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(session.clone());
    }

    fn get(&self, path: &str) -> Result<reqwest::RequestBuilder, MessagingError> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(self.token()?)
            .timeout(self.timeout))
    }

    fn post(&self, path: &str) -> Result<reqwest::RequestBuilder, MessagingError> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(self.token()?)
            .timeout(self.timeout))
    }

    /// Send a request and turn non-2xx statuses into errors. 401/403 map
    /// through `on_unauthorized` so login and restore can report their own
    /// variant.
    async fn execute(
        request: reqwest::RequestBuilder,
        on_unauthorized: fn(String) -> MessagingError,
    ) -> Result<reqwest::Response, MessagingError> {
        let response = request
            .send()
            .await
            .map_err(|e| MessagingError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Messaging response status: {}", status);
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        warn!("Messaging API error: {} - {}", status, body);
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(on_unauthorized(body));
        }
        Err(MessagingError::Api {
            status: status.as_u16(),
            message: body,
        })
    }

    async fn fetch_json<T: DeserializeOwned>(
        request: reqwest::RequestBuilder,
        on_unauthorized: fn(String) -> MessagingError,
    ) -> Result<T, MessagingError> {
        Self::execute(request, on_unauthorized)
            .await?
            .json::<T>()
            .await
            .map_err(|e| MessagingError::Parse(e.to_string()))
    }

    fn api_unauthorized(message: String) -> MessagingError {
        MessagingError::Api {
            status: 401,
            message,
        }
    }
}

#[async_trait]
impl MessagingClient for HttpMessenger {
    fn name(&self) -> &str {
        "http"
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthSession, MessagingError> {
        info!("Logging in as {}", credentials.email);
        let request = self
            .client
            .post(self.url("/auth/login"))
            .json(credentials)
            .timeout(self.timeout);
        let session: AuthSession = Self::fetch_json(request, MessagingError::Auth).await?;
        self.store_session(&session);
        Ok(session)
    }

    async fn restore_session(&self, token: &SessionToken) -> Result<AuthSession, MessagingError> {
        let request = self
            .client
            .get(self.url("/auth/session"))
            .bearer_auth(token.as_str())
            .timeout(self.timeout);
        let session: AuthSession = Self::fetch_json(request, MessagingError::InvalidSession).await?;
        info!("Restored session for user {}", session.user_id);
        self.store_session(&session);
        Ok(session)
    }

    async fn fetch_user_info(&self, user_id: &str) -> Result<UserInfo, MessagingError> {
        let request = self.get(&format!("/users/{user_id}"))?;
        Self::fetch_json(request, Self::api_unauthorized).await
    }

    async fn fetch_thread_list(&self, limit: usize) -> Result<Vec<Thread>, MessagingError> {
        let request = self.get("/threads")?.query(&[("limit", limit)]);
        let threads: Vec<Thread> = Self::fetch_json(request, Self::api_unauthorized).await?;
        debug!("Fetched {} threads", threads.len());
        Ok(threads)
    }

    async fn fetch_thread_messages(
        &self,
        thread_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, MessagingError> {
        let request = self
            .get(&format!("/threads/{thread_id}/messages"))?
            .query(&[("limit", limit)]);
        Self::fetch_json(request, Self::api_unauthorized).await
    }

    async fn search_threads(&self, query: &str) -> Result<Vec<Thread>, MessagingError> {
        let request = self.get("/search/threads")?.query(&[("q", query)]);
        Self::fetch_json(request, Self::api_unauthorized).await
    }

    async fn send_message(&self, text: &str, thread_id: &str) -> Result<(), MessagingError> {
        let body = SendRequest {
            text,
            client_id: uuid::Uuid::new_v4().to_string(),
        };
        debug!("Sending message to thread {} (client_id={})", thread_id, body.client_id);
        let request = self
            .post(&format!("/threads/{thread_id}/messages"))?
            .json(&body);
        Self::execute(request, Self::api_unauthorized).await?;
        Ok(())
    }

    async fn mark_as_read(&self, thread_id: &str) -> Result<(), MessagingError> {
        let request = self.post(&format!("/threads/{thread_id}/read"))?;
        Self::execute(request, Self::api_unauthorized).await?;
        Ok(())
    }

    async fn mark_as_delivered(
        &self,
        thread_id: &str,
        message_id: &str,
    ) -> Result<(), MessagingError> {
        let request = self.post(&format!(
            "/threads/{thread_id}/messages/{message_id}/delivered"
        ))?;
        Self::execute(request, Self::api_unauthorized).await?;
        Ok(())
    }

    async fn logout(&self) -> Result<(), MessagingError> {
        let request = self.post("/auth/logout")?;
        Self::execute(request, Self::api_unauthorized).await?;
        let mut guard = self.session.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        info!("Logged out");
        Ok(())
    }

    async fn listen(&self, sender: Sender<InboundMessage>) -> Result<(), MessagingError> {
        // No timeout: the event stream stays open for the whole session.
        let request = self
            .client
            .get(self.url("/events"))
            .bearer_auth(self.token()?)
            .header(reqwest::header::ACCEPT, "text/event-stream");
        let response = Self::execute(request, MessagingError::InvalidSession).await?;
        info!("Listening for inbound messages");

        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut current_event_type: Option<String> = None;
        let mut delivered = 0usize;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| MessagingError::Network(e.to_string()))?;
            buffer.extend_from_slice(&chunk);

            // Decode only complete lines; a chunk may end mid-character
            while let Some(line) = take_line(&mut buffer) {
                let line = match String::from_utf8(line) {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Skipping event stream line that is not UTF-8: {}", e);
                        continue;
                    }
                };
                let line = line.trim();

                if let Some(event_type) = line.strip_prefix("event: ") {
                    current_event_type = Some(event_type.to_string());
                    continue;
                }

                let Some(data) = line.strip_prefix("data: ") else {
                    continue;
                };
                match current_event_type.as_deref() {
                    Some("message") => match serde_json::from_str::<InboundMessage>(data) {
                        Ok(inbound) => {
                            delivered += 1;
                            debug!(
                                "Inbound message {} in thread {}",
                                inbound.message.id, inbound.thread_id
                            );
                            if sender.send(inbound).await.is_err() {
                                warn!("Inbound message send failed: receiver dropped");
                                return Err(MessagingError::ChannelClosed);
                            }
                        }
                        Err(e) => warn!("Skipping malformed inbound message: {}", e),
                    },
                    Some(other) => debug!("Ignoring event type '{}'", other),
                    None => debug!("Data without event type: {}", data),
                }
                current_event_type = None;
            }
        }

        info!("Event stream ended after {} messages", delivered);
        Ok(())
    }
}

/// Split the first `\n`-terminated line off `buffer`, without the newline.
fn take_line(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let pos = buffer.iter().position(|&b| b == b'\n')?;
    let mut line: Vec<u8> = buffer.drain(..=pos).collect();
    line.pop();
    Some(line)
}

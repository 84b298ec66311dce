//! Cached author lookups.
//!
//! Messages only carry an author id. Rendering them needs a name, so every
//! background task that formats messages goes through one shared
//! `UserDirectory`, which fetches each user once.

use std::collections::HashMap;
use std::sync::Arc;

use log::warn;
use tokio::sync::Mutex;

use super::client::MessagingClient;
use super::types::UserInfo;

pub struct UserDirectory {
    client: Arc<dyn MessagingClient>,
    cache: Mutex<HashMap<String, UserInfo>>,
}

impl UserDirectory {
    pub fn new(client: Arc<dyn MessagingClient>) -> Self {
        Self {
            client,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// A directory that already knows `user` (usually the logged-in account).
    pub fn with_user(client: Arc<dyn MessagingClient>, user: UserInfo) -> Self {
        let mut cache = HashMap::new();
        cache.insert(user.id.clone(), user);
        Self {
            client,
            cache: Mutex::new(cache),
        }
    }

    /// First name for `user_id`. Lookup failures fall back to the raw id and
    /// are not cached, so a later message retries the lookup.
    pub async fn first_name(&self, user_id: &str) -> String {
        if let Some(user) = self.cache.lock().await.get(user_id) {
            return user.display_first_name().to_string();
        }

        match self.client.fetch_user_info(user_id).await {
            Ok(user) => {
                let name = user.display_first_name().to_string();
                self.cache.lock().await.insert(user_id.to_string(), user);
                name
            }
            Err(e) => {
                warn!("Failed to fetch user {}: {}", user_id, e);
                user_id.to_string()
            }
        }
    }
}

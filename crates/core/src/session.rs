//! Session state kept in the client store

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{ClientStore, STORAGE_KEY_TOKEN, STORAGE_KEY_USER};
use crate::Result;

/// Cached display data for the logged-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserProfile {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: None,
        }
    }

    pub fn greeting(&self) -> String {
        format!("Welcome back, {}!", self.username)
    }
}

/// Authenticated session: bearer token plus optional user display data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: Option<UserProfile>) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    /// Read the session from the store.
    ///
    /// Returns `None` when no token is stored. A cached user object that
    /// fails to parse is dropped with a warning rather than failing the load.
    pub async fn load(store: &dyn ClientStore) -> Result<Option<Self>> {
        let Some(token) = store.get(STORAGE_KEY_TOKEN).await? else {
            return Ok(None);
        };

        let user = match store.get(STORAGE_KEY_USER).await? {
            Some(raw) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("Ignoring malformed cached user: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(Some(Self { token, user }))
    }

    /// Persist token and user under their well-known keys
    pub async fn save(&self, store: &dyn ClientStore) -> Result<()> {
        store.set(STORAGE_KEY_TOKEN, &self.token).await?;
        match &self.user {
            Some(user) => {
                let raw = serde_json::to_string(user)?;
                store.set(STORAGE_KEY_USER, &raw).await?;
            }
            None => store.remove(STORAGE_KEY_USER).await?,
        }
        debug!("Session saved");
        Ok(())
    }

    /// Wipe the store, preferences included
    pub async fn clear(store: &dyn ClientStore) -> Result<()> {
        store.clear().await?;
        debug!("Client store cleared");
        Ok(())
    }

    pub fn greeting(&self) -> Option<String> {
        self.user.as_ref().map(UserProfile::greeting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryClientStore;

    #[tokio::test]
    async fn test_load_without_token() {
        let store = MemoryClientStore::new();
        store.set(STORAGE_KEY_USER, r#"{"username":"ana"}"#).await.unwrap();

        assert!(Session::load(&store).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = MemoryClientStore::new();
        let session = Session::new("tok-1", Some(UserProfile::new("ana")));
        session.save(&store).await.unwrap();

        let loaded = Session::load(&store).await.unwrap().unwrap();
        assert_eq!(loaded, session);
        assert_eq!(loaded.greeting().as_deref(), Some("Welcome back, ana!"));
    }

    #[tokio::test]
    async fn test_malformed_user_is_ignored() {
        let store = MemoryClientStore::new();
        store.set(STORAGE_KEY_TOKEN, "tok-1").await.unwrap();
        store.set(STORAGE_KEY_USER, "{not json").await.unwrap();

        let loaded = Session::load(&store).await.unwrap().unwrap();
        assert_eq!(loaded.token, "tok-1");
        assert!(loaded.user.is_none());
        assert!(loaded.greeting().is_none());
    }

    #[tokio::test]
    async fn test_clear_removes_every_key() {
        let store = MemoryClientStore::new();
        Session::new("tok-1", Some(UserProfile::new("ana")))
            .save(&store)
            .await
            .unwrap();
        store.set("theme", "dark").await.unwrap();
        store.set("view_mode", "grid").await.unwrap();

        Session::clear(&store).await.unwrap();

        for key in [STORAGE_KEY_TOKEN, STORAGE_KEY_USER, "theme", "view_mode"] {
            assert!(store.get(key).await.unwrap().is_none());
        }
    }
}

//! Signed-in user context.
//!
//! A `SessionContext` is created once per process, initialized from a
//! `SessionStore`, and handed to whatever needs the current user.

pub mod store;

pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Stored form: the login response envelope `{ "data": user }` or a bare user.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredUser {
    Envelope { data: User },
    Bare(User),
}

pub struct SessionContext<S: SessionStore> {
    store: S,
    user: Option<User>,
}

impl<S: SessionStore> SessionContext<S> {
    /// Load the persisted user, if any. An unreadable entry is discarded and
    /// the session starts signed out.
    pub fn initialize(store: S) -> Self {
        let user = match store.load() {
            Ok(Some(raw)) => match serde_json::from_str::<StoredUser>(&raw) {
                Ok(StoredUser::Envelope { data }) => Some(data),
                Ok(StoredUser::Bare(user)) => Some(user),
                Err(e) => {
                    log::warn!("Failed to parse stored session, clearing it: {}", e);
                    if let Err(e) = store.remove() {
                        log::warn!("Failed to remove stored session: {}", e);
                    }
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!("Failed to read stored session: {}", e);
                None
            }
        };
        Self { store, user }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    pub fn set_user(&mut self, user: User) -> Result<()> {
        self.store.save(&serde_json::to_string(&user)?)?;
        self.user = Some(user);
        Ok(())
    }

    pub fn clear_user(&mut self) -> Result<()> {
        self.user = None;
        self.store.remove()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> User {
        User {
            username: name.to_string(),
            role: Some("admin".to_string()),
            token: None,
        }
    }

    #[test]
    fn test_empty_store_starts_signed_out() {
        let session = SessionContext::initialize(MemorySessionStore::default());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_set_and_clear_persist() {
        let store = MemorySessionStore::default();
        let mut session = SessionContext::initialize(store.clone());
        session.set_user(user("alice")).unwrap();
        assert_eq!(session.username(), Some("alice"));

        let reloaded = SessionContext::initialize(store.clone());
        assert_eq!(reloaded.user(), Some(&user("alice")));

        session.clear_user().unwrap();
        assert!(session.user().is_none());
        assert!(SessionContext::initialize(store).user().is_none());
    }

    #[test]
    fn test_accepts_response_envelope() {
        let store = MemorySessionStore::with_value(r#"{"code":200,"data":{"username":"bob","token":"t-1"}}"#);
        let session = SessionContext::initialize(store);
        assert_eq!(session.username(), Some("bob"));
        assert_eq!(session.user().and_then(|u| u.token.as_deref()), Some("t-1"));
    }

    #[test]
    fn test_corrupt_entry_is_cleared() {
        let store = MemorySessionStore::with_value("{not json");
        let session = SessionContext::initialize(store.clone());
        assert!(session.user().is_none());
        assert_eq!(store.load().unwrap(), None);
    }
}

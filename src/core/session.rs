//! Session holder - the bearer token and the cached signed-in user
//!
//! Authentication state is nothing more than the presence of a token. The
//! store keeps exactly two keys: `auth_token` and `auth_user` (the user
//! serialized as JSON).

use thiserror::Error;

use crate::core::storage::{KeyValueStore, StorageError};
use crate::entities::User;

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "auth_user";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("cannot encode user: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct Session {
    store: Box<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn get_token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn set_token(&mut self, token: &str) -> Result<(), SessionError> {
        self.store.set(TOKEN_KEY, token)?;
        Ok(())
    }

    pub fn remove_token(&mut self) -> Result<(), SessionError> {
        self.store.remove(TOKEN_KEY)?;
        Ok(())
    }

    /// The stored user, or `None` when absent or unreadable
    pub fn get_user(&self) -> Option<User> {
        let raw = self.store.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable stored user");
                None
            }
        }
    }

    pub fn set_user(&mut self, user: &User) -> Result<(), SessionError> {
        let raw = serde_json::to_string(user)?;
        self.store.set(USER_KEY, &raw)?;
        Ok(())
    }

    pub fn remove_user(&mut self) -> Result<(), SessionError> {
        self.store.remove(USER_KEY)?;
        Ok(())
    }

    /// Store a freshly issued token together with its user
    pub fn sign_in(&mut self, token: &str, user: &User) -> Result<(), SessionError> {
        self.set_token(token)?;
        self.set_user(user)
    }

    /// Forget both token and user
    pub fn clear_auth(&mut self) -> Result<(), SessionError> {
        self.remove_token()?;
        self.remove_user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.get_token().is_some()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;

    fn user() -> User {
        serde_json::from_str(r#"{"id": 1, "name": "Dana", "email": "dana@clinic.com"}"#).unwrap()
    }

    #[test]
    fn test_authenticated_iff_token() {
        let store = MemoryStore::new();
        let mut session = Session::new(store.clone());
        assert!(!session.is_authenticated());

        session.set_user(&user()).unwrap();
        assert!(!session.is_authenticated());

        session.set_token("tok").unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.get_user().unwrap().email, "dana@clinic.com");
    }

    #[test]
    fn test_exactly_two_keys() {
        let store = MemoryStore::new();
        let mut session = Session::new(store.clone());
        session.sign_in("tok", &user()).unwrap();
        assert_eq!(store.keys(), vec![TOKEN_KEY.to_string(), USER_KEY.to_string()]);

        session.clear_auth().unwrap();
        assert!(store.is_empty());
        assert!(!session.is_authenticated());
        assert!(session.get_user().is_none());
    }

    #[test]
    fn test_unreadable_user_is_none() {
        let mut store = MemoryStore::new();
        store.set(USER_KEY, "not json").unwrap();
        let session = Session::new(store);
        assert!(session.get_user().is_none());
    }
}

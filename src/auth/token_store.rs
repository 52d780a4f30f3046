//! Persistent storage of the session's tokens and user snapshot.
//!
//! The [`TokenStore`] is the single owner of credential persistence. The
//! request executor reads the access token from it, the reauthentication
//! wrapper rotates the pair through it, and the session state writes the
//! user snapshot through it.
//!
//! # Example
//!
//! ```rust
//! use a1french_api::auth::{TokenKind, TokenStore};
//! use a1french_api::TokenPair;
//!
//! let store = TokenStore::in_memory();
//! store.set(&TokenPair::new("T1", "R1")).unwrap();
//! assert_eq!(store.get(TokenKind::Access).as_deref(), Some("T1"));
//!
//! store.clear().unwrap();
//! assert!(store.get(TokenKind::Refresh).is_none());
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use crate::auth::storage::{MemoryStorage, SessionStorage, StorageError};
use crate::auth::{TokenKind, TokenPair, User};

/// Storage key of the serialized user snapshot.
pub const USER_KEY: &str = "user";

/// Token and user-snapshot persistence over a [`SessionStorage`] backend.
///
/// Writing a pair and clearing happen under an exclusive guard, and reading
/// takes a shared one, so no caller can observe a pair where only one of
/// the two tokens has been replaced.
///
/// # Thread Safety
///
/// `TokenStore` is `Send + Sync` and is normally shared via `Arc`.
#[derive(Debug)]
pub struct TokenStore {
    storage: Arc<dyn SessionStorage>,
    guard: RwLock<()>,
}

// Verify TokenStore is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TokenStore>();
};

impl TokenStore {
    /// Creates a store over the given backend.
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            guard: RwLock::new(()),
        }
    }

    /// Creates a store over a fresh [`MemoryStorage`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Returns the requested token, if one is stored.
    #[must_use]
    pub fn get(&self, kind: TokenKind) -> Option<String> {
        let _read = self.guard.read().unwrap_or_else(PoisonError::into_inner);
        self.storage.get(kind.storage_key())
    }

    /// Returns the access token, if one is stored.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.get(TokenKind::Access)
    }

    /// Returns the refresh token, if one is stored.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.get(TokenKind::Refresh)
    }

    /// Returns both tokens when both are stored.
    #[must_use]
    pub fn token_pair(&self) -> Option<TokenPair> {
        let _read = self.guard.read().unwrap_or_else(PoisonError::into_inner);
        let access = self.storage.get(TokenKind::Access.storage_key())?;
        let refresh = self.storage.get(TokenKind::Refresh.storage_key())?;
        Some(TokenPair::new(access, refresh))
    }

    /// Replaces both tokens.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot persist the pair.
    pub fn set(&self, pair: &TokenPair) -> Result<(), StorageError> {
        let _write = self.guard.write().unwrap_or_else(PoisonError::into_inner);
        self.storage.set_many(&[
            (TokenKind::Access.storage_key(), pair.access_token.as_str()),
            (TokenKind::Refresh.storage_key(), pair.refresh_token.as_str()),
        ])
    }

    /// Removes both tokens and the user snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot persist the removal.
    pub fn clear(&self) -> Result<(), StorageError> {
        let _write = self.guard.write().unwrap_or_else(PoisonError::into_inner);
        self.storage.remove_many(&[
            TokenKind::Access.storage_key(),
            TokenKind::Refresh.storage_key(),
            USER_KEY,
        ])
    }

    /// Persists a user snapshot for session restoration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the user cannot be serialized or stored.
    pub fn set_user(&self, user: &User) -> Result<(), StorageError> {
        let json = serde_json::to_string(user)?;
        let _write = self.guard.write().unwrap_or_else(PoisonError::into_inner);
        self.storage.set(USER_KEY, &json)
    }

    /// Returns the persisted user snapshot.
    ///
    /// A snapshot that no longer parses is treated as absent.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        let raw = {
            let _read = self.guard.read().unwrap_or_else(PoisonError::into_inner);
            self.storage.get(USER_KEY)?
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Ignoring unreadable user snapshot in session storage: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_both_tokens() {
        let store = TokenStore::in_memory();
        assert!(store.access_token().is_none());
        assert!(store.token_pair().is_none());

        store.set(&TokenPair::new("T1", "R1")).unwrap();
        assert_eq!(store.access_token().as_deref(), Some("T1"));
        assert_eq!(store.refresh_token().as_deref(), Some("R1"));
        assert_eq!(store.token_pair(), Some(TokenPair::new("T1", "R1")));

        store.set(&TokenPair::new("T2", "R2")).unwrap();
        assert_eq!(store.token_pair(), Some(TokenPair::new("T2", "R2")));
    }

    #[test]
    fn test_clear_removes_tokens_and_user() {
        let store = TokenStore::in_memory();
        store.set(&TokenPair::new("T1", "R1")).unwrap();
        store.set_user(&User::new(7_u64, "Léa", "lea@example.com")).unwrap();

        store.clear().unwrap();
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
        assert!(store.user().is_none());
    }

    #[test]
    fn test_user_snapshot_round_trip() {
        let store = TokenStore::in_memory();
        let user = User::new(7_u64, "Léa", "lea@example.com");
        store.set_user(&user).unwrap();
        assert_eq!(store.user(), Some(user));
    }

    #[test]
    fn test_unreadable_user_snapshot_is_absent() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(USER_KEY, "not json").unwrap();
        let store = TokenStore::new(storage);
        assert!(store.user().is_none());
    }

    #[test]
    fn test_shares_backend_with_other_handles() {
        let storage: Arc<dyn SessionStorage> = Arc::new(MemoryStorage::new());
        let store = TokenStore::new(Arc::clone(&storage));
        store.set(&TokenPair::new("T1", "R1")).unwrap();

        assert_eq!(storage.get("access_token").as_deref(), Some("T1"));
        assert_eq!(storage.get("refresh_token").as_deref(), Some("R1"));
    }
}

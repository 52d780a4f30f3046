//! Auth session state for the signed-in user.
//!
//! This module provides [`AuthSession`], the single owner of "who is signed
//! in", and [`SessionState`], a point-in-time copy of it.
//!
//! The session is built once at start-up from persisted storage and shared
//! by reference (normally inside an `Arc`) with everything that needs it.
//! Tokens are not duplicated here: they live in the [`TokenStore`], and the
//! session only tracks the user and whether the user is considered signed in.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use a1french_api::{AuthSession, TokenPair, TokenStore, User, UserPatch};
//!
//! let tokens = Arc::new(TokenStore::in_memory());
//! let session = AuthSession::new(Arc::clone(&tokens));
//!
//! session
//!     .set_credentials(User::new(1_u64, "Amélie", "a@b.com"), &TokenPair::new("T1", "R1"))
//!     .unwrap();
//! assert!(session.is_authenticated());
//!
//! session.update_user(&UserPatch::default().name("Amélie P.")).unwrap();
//! assert_eq!(session.current_user().unwrap().name, "Amélie P.");
//!
//! session.logout().unwrap();
//! assert!(!session.is_authenticated());
//! assert!(tokens.access_token().is_none());
//! ```

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::auth::storage::StorageError;
use crate::auth::{TokenPair, TokenStore, User, UserPatch};

#[derive(Debug, Default)]
struct Inner {
    user: Option<User>,
    is_authenticated: bool,
}

/// A snapshot of the session.
///
/// `is_authenticated` is only ever `true` when an access token was present
/// at the time the snapshot was taken.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The signed-in user, if known.
    pub user: Option<User>,
    /// The stored access token.
    pub access_token: Option<String>,
    /// The stored refresh token.
    pub refresh_token: Option<String>,
    /// Whether the user is signed in.
    pub is_authenticated: bool,
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("user", &self.user)
            .field("access_token", &self.access_token.as_ref().map(|_| "*****"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "*****"))
            .field("is_authenticated", &self.is_authenticated)
            .finish()
    }
}

/// The current user and authentication flag.
///
/// # Thread Safety
///
/// `AuthSession` is `Send + Sync`. Its lock is never held across an
/// `.await`.
#[derive(Debug)]
pub struct AuthSession {
    tokens: Arc<TokenStore>,
    state: RwLock<Inner>,
}

// Verify AuthSession and SessionState are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthSession>();
    assert_send_sync::<SessionState>();
};

impl AuthSession {
    /// Creates a logged-out session over the given token store.
    ///
    /// Nothing is read from storage; see [`from_storage`](Self::from_storage).
    #[must_use]
    pub fn new(tokens: Arc<TokenStore>) -> Self {
        Self {
            tokens,
            state: RwLock::new(Inner::default()),
        }
    }

    /// Creates a session and initializes it from persisted storage.
    #[must_use]
    pub fn from_storage(tokens: Arc<TokenStore>) -> Self {
        let session = Self::new(tokens);
        session.initialize_from_storage();
        session
    }

    /// Rebuilds the session from the persisted tokens and user snapshot.
    ///
    /// No network call is made. The session is considered authenticated
    /// whenever an access token is present; validating that token against
    /// the server is the caller's follow-up.
    pub fn initialize_from_storage(&self) -> SessionState {
        let user = self.tokens.user();
        let is_authenticated = self.tokens.access_token().is_some();

        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.user = user;
            state.is_authenticated = is_authenticated;
        }

        tracing::debug!(
            is_authenticated,
            "Session initialized from storage"
        );
        self.snapshot()
    }

    /// Signs a user in: stores both tokens, persists the user snapshot, and
    /// marks the session authenticated.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the tokens or user cannot be persisted.
    /// The in-memory state is left unchanged in that case, and tokens that
    /// were already stored are removed again.
    pub fn set_credentials(&self, user: User, pair: &TokenPair) -> Result<(), StorageError> {
        self.tokens.set(pair)?;
        if let Err(e) = self.tokens.set_user(&user) {
            if let Err(clear_err) = self.tokens.clear() {
                tracing::warn!("Failed to roll back stored tokens: {}", clear_err);
            }
            return Err(e);
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        tracing::info!(user_id = %user.id, "Session credentials set");
        state.user = Some(user);
        state.is_authenticated = true;
        Ok(())
    }

    /// Shallow-merges `patch` into the current user and re-persists it.
    ///
    /// Returns `Ok(false)` without touching anything when no user is set.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the updated snapshot cannot be persisted.
    pub fn update_user(&self, patch: &UserPatch) -> Result<bool, StorageError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let Some(current) = state.user.as_ref() else {
            return Ok(false);
        };

        let mut updated = current.clone();
        updated.apply(patch);
        self.tokens.set_user(&updated)?;
        state.user = Some(updated);
        Ok(true)
    }

    /// Clears the token store and resets the session to logged-out.
    ///
    /// Calling this on an already logged-out session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the stored tokens cannot be removed. The
    /// in-memory state is reset regardless.
    pub fn logout(&self) -> Result<(), StorageError> {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.is_authenticated || state.user.is_some() {
                tracing::info!("Session logged out");
            }
            *state = Inner::default();
        }
        self.tokens.clear()
    }

    /// Returns a copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let access_token = self.tokens.access_token();
        SessionState {
            user: state.user.clone(),
            is_authenticated: state.is_authenticated && access_token.is_some(),
            refresh_token: self.tokens.refresh_token(),
            access_token,
        }
    }

    /// Returns `true` when signed in with an access token present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        let flagged = self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated;
        flagged && self.tokens.access_token().is_some()
    }

    /// Returns the signed-in user, if known.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    /// Returns the token store backing this session.
    #[must_use]
    pub const fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::storage::{MemoryStorage, SessionStorage};

    fn session() -> AuthSession {
        AuthSession::new(Arc::new(TokenStore::in_memory()))
    }

    #[test]
    fn test_new_session_is_logged_out() {
        let session = session();
        let state = session.snapshot();
        assert!(!state.is_authenticated);
        assert!(state.user.is_none());
        assert!(state.access_token.is_none());
    }

    #[test]
    fn test_set_credentials_signs_in() {
        let session = session();
        session
            .set_credentials(User::new(1_u64, "Jean", "jean@example.com"), &TokenPair::new("T1", "R1"))
            .unwrap();

        let state = session.snapshot();
        assert!(state.is_authenticated);
        assert_eq!(state.access_token.as_deref(), Some("T1"));
        assert_eq!(state.refresh_token.as_deref(), Some("R1"));
        assert_eq!(state.user.unwrap().name, "Jean");
    }

    /// Memory storage that refuses to persist the user snapshot.
    #[derive(Debug, Default)]
    struct UserWriteFails {
        inner: MemoryStorage,
    }

    impl SessionStorage for UserWriteFails {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == crate::auth::USER_KEY {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_set_credentials_rolls_back_tokens_when_user_write_fails() {
        let storage: Arc<dyn SessionStorage> = Arc::new(UserWriteFails::default());
        let session = AuthSession::new(Arc::new(TokenStore::new(Arc::clone(&storage))));

        let result = session.set_credentials(
            User::new(1_u64, "Jean", "jean@example.com"),
            &TokenPair::new("T1", "R1"),
        );

        assert!(matches!(result, Err(StorageError::Io(_))));
        assert!(storage.get("access_token").is_none());
        assert!(storage.get("refresh_token").is_none());
        assert_eq!(session.snapshot(), SessionState::default());

        // A restart finds nothing to restore
        let restarted = AuthSession::from_storage(Arc::new(TokenStore::new(storage)));
        assert!(!restarted.is_authenticated());
    }

    #[test]
    fn test_initialize_from_storage_reconstructs_session() {
        let storage: Arc<dyn SessionStorage> = Arc::new(MemoryStorage::new());
        let first = AuthSession::new(Arc::new(TokenStore::new(Arc::clone(&storage))));
        first
            .set_credentials(User::new(42_u64, "Jean", "jean@example.com"), &TokenPair::new("T1", "R1"))
            .unwrap();

        let second = AuthSession::from_storage(Arc::new(TokenStore::new(storage)));
        let state = second.snapshot();
        assert!(state.is_authenticated);
        assert_eq!(state.user.unwrap().id.as_str(), "42");
    }

    #[test]
    fn test_initialize_without_access_token_is_logged_out() {
        let storage: Arc<dyn SessionStorage> = Arc::new(MemoryStorage::new());
        storage.set("refresh_token", "R1").unwrap();

        let session = AuthSession::from_storage(Arc::new(TokenStore::new(storage)));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_update_user_without_user_is_noop() {
        let session = session();
        let changed = session.update_user(&UserPatch::default().name("New")).unwrap();

        assert!(!changed);
        assert!(session.current_user().is_none());
        assert!(session.tokens().user().is_none());
    }

    #[test]
    fn test_update_user_merges_and_persists() {
        let session = session();
        session
            .set_credentials(User::new(1_u64, "Old", "old@example.com"), &TokenPair::new("T1", "R1"))
            .unwrap();

        assert!(session.update_user(&UserPatch::default().name("New")).unwrap());
        assert_eq!(session.current_user().unwrap().name, "New");
        assert_eq!(session.tokens().user().unwrap().name, "New");
        assert_eq!(session.current_user().unwrap().email, "old@example.com");
    }

    #[test]
    fn test_logout_twice_equals_once() {
        let session = session();
        session
            .set_credentials(User::new(1_u64, "Jean", "jean@example.com"), &TokenPair::new("T1", "R1"))
            .unwrap();

        session.logout().unwrap();
        let once = session.snapshot();
        session.logout().unwrap();
        let twice = session.snapshot();

        assert_eq!(once, twice);
        assert_eq!(once, SessionState::default());
    }

    #[test]
    fn test_cleared_tokens_make_session_unauthenticated() {
        let session = session();
        session
            .set_credentials(User::new(1_u64, "Jean", "jean@example.com"), &TokenPair::new("T1", "R1"))
            .unwrap();

        session.tokens().clear().unwrap();
        assert!(!session.is_authenticated());
        assert!(!session.snapshot().is_authenticated);
    }

    #[test]
    fn test_session_state_debug_masks_tokens() {
        let state = SessionState {
            access_token: Some("T1-secret".to_string()),
            refresh_token: Some("R1-secret".to_string()),
            ..SessionState::default()
        };
        let debug = format!("{state:?}");
        assert!(!debug.contains("T1-secret"));
        assert!(!debug.contains("R1-secret"));
    }
}

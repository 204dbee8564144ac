//! Bearer credential storage.
//!
//! The sync layer only ever reads the access token to authorize a
//! request and clears both tokens when the server reports the session
//! expired; minting and refreshing credentials happens elsewhere.

use std::sync::Mutex;

/// Storage for the access/refresh token pair.
///
/// Implementations must be cheap to read; the access token is consulted
/// on every request.
pub trait TokenStore: Send + Sync {
    /// Current access token, if a session is held.
    fn access_token(&self) -> Option<String>;

    /// Current refresh token, if a session is held.
    fn refresh_token(&self) -> Option<String>;

    /// Replace both tokens (after login or a refresh).
    fn set_tokens(&self, access: String, refresh: String);

    /// Drop both tokens (logout or session expiry).
    fn clear(&self);
}

#[derive(Debug, Default)]
struct TokenPair {
    access: Option<String>,
    refresh: Option<String>,
}

/// In-memory token store for one client session.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: Mutex<TokenPair>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with an access token (no refresh token).
    pub fn with_access_token(access: impl Into<String>) -> Self {
        let store = Self::default();
        store.inner.lock().expect("token lock poisoned").access = Some(access.into());
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.inner.lock().expect("token lock poisoned").access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.inner.lock().expect("token lock poisoned").refresh.clone()
    }

    fn set_tokens(&self, access: String, refresh: String) {
        let mut inner = self.inner.lock().expect("token lock poisoned");
        inner.access = Some(access);
        inner.refresh = Some(refresh);
    }

    fn clear(&self) {
        let mut inner = self.inner.lock().expect("token lock poisoned");
        inner.access = None;
        inner.refresh = None;
    }
}

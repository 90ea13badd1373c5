//! Session token storage.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// Access/refresh pair issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    /// Short-lived bearer token.
    pub access: String,
    /// Long-lived token used to mint new access tokens.
    pub refresh: String,
}

impl SessionTokens {
    /// Build a token pair.
    #[must_use]
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

/// Somewhere to keep the current session.
pub trait TokenStore: Send + Sync {
    /// Current tokens, if logged in.
    fn tokens(&self) -> Option<SessionTokens>;

    /// Replace the stored tokens.
    fn store(&self, tokens: SessionTokens);

    /// Swap in a refreshed access token, keeping the refresh token.
    ///
    /// Does nothing when no session is stored.
    fn set_access(&self, access: String);

    /// Forget the session.
    fn clear(&self);
}

/// In-process token store.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    inner: Arc<RwLock<Option<SessionTokens>>>,
}

impl MemoryTokenStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with tokens.
    #[must_use]
    pub fn with_tokens(tokens: SessionTokens) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(tokens))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn tokens(&self) -> Option<SessionTokens> {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn store(&self, tokens: SessionTokens) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(tokens);
    }

    fn set_access(&self, access: String) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(tokens) = guard.as_mut() {
            tokens.access = access;
        } else {
            tracing::warn!("Ignoring refreshed access token without a session");
        }
    }

    fn clear(&self) {
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
    }
}

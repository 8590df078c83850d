//! In-memory holder of the current access token

use arc_swap::ArcSwapOption;
use std::fmt;
use std::sync::Arc;

/// Shared cell holding the current access token, if any
///
/// Clones share the same cell. There is no persistence and no change
/// notification; concurrent writers race and the last write wins. The session
/// client is the only component expected to call [`TokenStore::set`].
#[derive(Clone, Default)]
pub struct TokenStore {
    inner: Arc<ArcSwapOption<String>>,
}

impl TokenStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current token (`None` clears it)
    pub fn set(&self, token: Option<String>) {
        self.inner.store(token.map(Arc::new));
    }

    /// Current token
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.inner.load_full().map(|token| token.as_ref().clone())
    }

    /// Whether a token is currently held
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.inner.load().is_some()
    }

    /// Drop the current token
    pub fn clear(&self) {
        self.set(None);
    }

    /// Guard that clears the store when dropped, whatever path the scope exits by
    pub(crate) fn clear_on_drop(&self) -> ClearOnDrop<'_> {
        ClearOnDrop(self)
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("token", &self.is_set().then_some("<redacted>"))
            .finish()
    }
}

pub(crate) struct ClearOnDrop<'a>(&'a TokenStore);

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        self.0.clear();
    }
}

use cookie::Cookie;
use dashmap::DashMap;
use std::sync::Arc;

/// Name-keyed cookie storage for one session.
///
/// Holds at most one cookie per name: the most recently written one. Domain,
/// path and expiry travel with the stored cookie but are never consulted,
/// so every stored cookie is replayed on every request the session builds.
///
/// Backed by a sharded lock map, so a jar can be shared between the session
/// and its redirect policy and used from several threads at once.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    store: Arc<DashMap<String, Cookie<'static>>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the cookie with this cookie's name.
    ///
    /// The previous record is dropped as a whole; attributes are never merged.
    pub fn put(&self, cookie: Cookie<'static>) {
        tracing::trace!(name = %cookie.name(), "storing cookie");
        self.store.insert(cookie.name().to_string(), cookie);
    }

    /// Store every cookie in `cookies`, later entries winning on name clashes.
    pub fn extend<I>(&self, cookies: I)
    where
        I: IntoIterator<Item = Cookie<'static>>,
    {
        for cookie in cookies {
            self.put(cookie);
        }
    }

    /// Snapshot of all stored cookies, in no particular order.
    pub fn all(&self) -> Vec<Cookie<'static>> {
        self.store.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Look up the stored cookie with this name.
    pub fn get(&self, name: &str) -> Option<Cookie<'static>> {
        self.store.get(name).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

//! Per-user search session store.
//!
//! Holds at most one entry per user: the ranked, classified results of their
//! last search plus the flags it ran with. A new search replaces the entry
//! wholesale; a selection consumes it, so a stale list can never be
//! re-selected.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::classifier::ClassifiedResult;
use crate::searcher::SearchMode;

/// Identifier of the user owning a session (chat user id).
pub type UserId = i64;

/// One user's cached search.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    /// Ranked, classified results as displayed.
    pub results: Vec<ClassifiedResult>,
    /// Target folder under the save root, if any.
    pub folder: Option<String>,
    /// The mode the search ran in.
    pub mode: SearchMode,
    /// Whether the user asked to be notified on completion.
    pub notify: bool,
}

/// Session store mapping user ids to their latest search.
#[derive(Default)]
pub struct SessionStore {
    entries: RwLock<HashMap<UserId, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the user's session with a new entry.
    pub async fn replace(&self, user: UserId, entry: SessionEntry) {
        self.entries.write().await.insert(user, entry);
    }

    /// Consume the user's session, removing it from the store.
    pub async fn take(&self, user: UserId) -> Option<SessionEntry> {
        self.entries.write().await.remove(&user)
    }

    /// Whether the user currently has a cached search.
    pub async fn has_session(&self, user: UserId) -> bool {
        self.entries.read().await.contains_key(&user)
    }
}

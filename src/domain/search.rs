use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::StorageError;
use crate::storage::{load_json, store_json, LocalStore, RECENT_SEARCHES_KEY};

/// A dish the user searched for and opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSearch {
    pub id: String,
    #[serde(default)]
    pub food_name: String,
    #[serde(default)]
    pub restaurant_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub searched_at: u64,
}

impl RecentSearch {
    pub fn new(id: impl Into<String>, food_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            food_name: food_name.into(),
            restaurant_name: None,
            image: None,
            searched_at: 0,
        }
    }
}

/// Most-recent-first search history, persisted on every change.
#[derive(Debug)]
pub struct SearchHistory {
    entries: Vec<RecentSearch>,
    store: Arc<dyn LocalStore>,
}

impl SearchHistory {
    /// Loads the persisted history; unreadable data starts an empty one.
    pub fn load(store: Arc<dyn LocalStore>) -> Self {
        let entries = match load_json::<Vec<RecentSearch>>(store.as_ref(), RECENT_SEARCHES_KEY) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                error!(error = %e, "Search history corrupted, starting empty");
                Vec::new()
            }
        };
        Self { entries, store }
    }

    pub fn entries(&self) -> &[RecentSearch] {
        &self.entries
    }

    /// Puts `search` first, dropping any older entry with the same id.
    pub fn add(&mut self, mut search: RecentSearch) {
        search.searched_at = now_millis();
        self.entries.retain(|entry| entry.id != search.id);
        self.entries.insert(0, search);
        self.persist();
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        let removed = self.entries.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!(error = %e, "Failed to persist search history");
        }
    }

    fn save(&self) -> Result<(), StorageError> {
        store_json(self.store.as_ref(), RECENT_SEARCHES_KEY, &self.entries)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

//! In-process tag-scoped cache.
//!
//! Entries are indexed by tag so that invalidating a tag never needs to scan
//! keys. A key that is stored again replaces both its value and its tags.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use tracing::debug;

use crate::error::WorkspaceError;
use crate::traits::TagCache;

#[derive(Debug)]
struct CacheEntry {
    value: Vec<i64>,
    tags: Vec<String>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    tags: HashMap<String, HashSet<String>>,
}

impl CacheState {
    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        for tag in &entry.tags {
            if let Some(keys) = self.tags.get_mut(tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.tags.remove(tag);
                }
            }
        }
        Some(entry)
    }
}

/// A thread-safe [`TagCache`] kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryTagCache {
    state: RwLock<CacheState>,
}

impl InMemoryTagCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tags currently attached to `key`.
    pub fn tags_of(&self, key: &str) -> Vec<String> {
        self.state
            .read()
            .ok()
            .and_then(|s| s.entries.get(key).map(|e| e.tags.clone()))
            .unwrap_or_default()
    }
}

impl TagCache for InMemoryTagCache {
    fn get(&self, key: &str) -> Result<Option<Vec<i64>>, WorkspaceError> {
        let state = self.state.read()?;
        Ok(state.entries.get(key).map(|e| e.value.clone()))
    }

    fn set(&self, key: &str, value: Vec<i64>, tags: &[String]) -> Result<(), WorkspaceError> {
        let mut state = self.state.write()?;
        state.remove(key);
        for tag in tags {
            state
                .tags
                .entry(tag.clone())
                .or_default()
                .insert(key.to_string());
        }
        state.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                tags: tags.to_vec(),
            },
        );
        Ok(())
    }

    fn invalidate_tag(&self, tag: &str) -> Result<usize, WorkspaceError> {
        let mut state = self.state.write()?;
        let keys = state.tags.remove(tag).unwrap_or_default();
        let removed = keys.iter().filter(|k| state.remove(k).is_some()).count();
        debug!(event = "Cache", phase = "Invalidate", tag = tag, removed = removed);
        Ok(removed)
    }
}

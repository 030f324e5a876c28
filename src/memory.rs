//! In-memory workspace entries and element relations.
//!
//! These implement the storage seams without a database. Element queries are
//! answered by evaluating the query's [`PathFilter`](crate::PathFilter)
//! against each stored row.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::error::WorkspaceError;
use crate::query::ElementQuery;
use crate::traits::{ElementQueryExecutor, WorkspaceSource};
use crate::types::{ResourceType, WorkspaceEntry};

/// Workspace entries held in memory.
#[derive(Debug, Default)]
pub struct InMemoryWorkspaceSource {
    entries: RwLock<Vec<WorkspaceEntry>>,
}

impl InMemoryWorkspaceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, entry: WorkspaceEntry) -> Result<(), WorkspaceError> {
        self.entries.write()?.push(entry);
        Ok(())
    }

    pub fn extend<I: IntoIterator<Item = WorkspaceEntry>>(
        &self,
        entries: I,
    ) -> Result<(), WorkspaceError> {
        self.entries.write()?.extend(entries);
        Ok(())
    }

    /// Remove every entry of `principal_id`, returning how many were removed.
    pub fn remove_principal(&self, principal_id: i64) -> Result<usize, WorkspaceError> {
        let mut entries = self.entries.write()?;
        let before = entries.len();
        entries.retain(|e| e.principal_id != principal_id);
        Ok(before - entries.len())
    }
}

impl WorkspaceSource for InMemoryWorkspaceSource {
    fn fetch(
        &self,
        resource_type: ResourceType,
        principal_ids: &[i64],
    ) -> Result<Vec<WorkspaceEntry>, WorkspaceError> {
        let entries = self.entries.read()?;
        Ok(entries
            .iter()
            .filter(|e| e.resource_type == resource_type && principal_ids.contains(&e.principal_id))
            .cloned()
            .collect())
    }
}

/// Element rows (`id`, full path) grouped by relation name.
#[derive(Debug, Default)]
pub struct InMemoryElementStore {
    relations: RwLock<HashMap<String, Vec<(i64, String)>>>,
}

impl InMemoryElementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<R, P>(&self, relation: R, id: i64, path: P) -> Result<(), WorkspaceError>
    where
        R: Into<String>,
        P: Into<String>,
    {
        self.relations
            .write()?
            .entry(relation.into())
            .or_default()
            .push((id, path.into()));
        Ok(())
    }
}

impl ElementQueryExecutor for InMemoryElementStore {
    fn fetch_ids(&self, query: &ElementQuery) -> Result<Vec<i64>, WorkspaceError> {
        let relations = self.relations.read()?;
        let rows = relations.get(query.relation()).ok_or_else(|| {
            WorkspaceError::QueryExecution(format!(
                "relation '{}' does not exist",
                query.relation()
            ))
        })?;

        let mut seen = HashSet::new();
        Ok(rows
            .iter()
            .filter(|(_, path)| query.filter().matches(path))
            .filter_map(|(id, _)| seen.insert(*id).then_some(*id))
            .collect())
    }
}

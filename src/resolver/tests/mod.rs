use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::cache::InMemoryTagCache;
use crate::memory::{InMemoryElementStore, InMemoryWorkspaceSource};
use crate::types::{User, WorkspaceEntry};


const ALICE: i64 = 10;
const BOB: i64 = 11;
const EDITORS: i64 = 20;
const SHOPPERS: i64 = 21;

const OBJECTS: &str = "objects";

/// Paths of the `objects` relation, ids in insertion order.
const OBJECT_PATHS: &[(i64, &str)] = &[
    (1, "/"),
    (2, "/catalog"),
    (3, "/catalog/new"),
    (4, "/catalog/archive"),
    (5, "/catalog/archive/old"),
    (6, "/catalogue/misc"),
    (7, "/shop/cart"),
    (8, "/media/images"),
];

fn entries() -> Vec<WorkspaceEntry> {
    vec![
        WorkspaceEntry::allow(ALICE, ResourceType::Object, "/catalog"),
        WorkspaceEntry::deny(ALICE, ResourceType::Object, "/catalog/archive"),
        WorkspaceEntry::allow(ALICE, ResourceType::Asset, "/media"),
        WorkspaceEntry::deny(SHOPPERS, ResourceType::Object, "/shop"),
        WorkspaceEntry::allow(EDITORS, ResourceType::Object, "/media"),
        WorkspaceEntry::deny(EDITORS, ResourceType::Object, "/catalog"),
    ]
}

/// Wraps an executor and counts how often it is called.
struct CountingExecutor {
    inner: Arc<dyn ElementQueryExecutor>,
    calls: AtomicUsize,
}

impl CountingExecutor {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ElementQueryExecutor for CountingExecutor {
    fn fetch_ids(&self, query: &ElementQuery) -> Result<Vec<i64>, WorkspaceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_ids(query)
    }
}

/// A cache backend that is always down.
struct BrokenCache;

impl TagCache for BrokenCache {
    fn get(&self, _key: &str) -> Result<Option<Vec<i64>>, WorkspaceError> {
        Err(WorkspaceError::Cache("connection refused".to_string()))
    }

    fn set(&self, _key: &str, _value: Vec<i64>, _tags: &[String]) -> Result<(), WorkspaceError> {
        Err(WorkspaceError::Cache("connection refused".to_string()))
    }

    fn invalidate_tag(&self, _tag: &str) -> Result<usize, WorkspaceError> {
        Err(WorkspaceError::Cache("connection refused".to_string()))
    }
}

struct Fixture {
    resolver: WorkspaceResolver,
    source: Arc<InMemoryWorkspaceSource>,
    store: Arc<InMemoryElementStore>,
    executor: Arc<CountingExecutor>,
    cache: Arc<InMemoryTagCache>,
}

fn fixture() -> Fixture {
    let source = Arc::new(InMemoryWorkspaceSource::new());
    source.extend(entries()).unwrap();

    let store = Arc::new(InMemoryElementStore::new());
    for (id, path) in OBJECT_PATHS {
        store.insert(OBJECTS, *id, *path).unwrap();
    }

    let executor = Arc::new(CountingExecutor {
        inner: store.clone(),
        calls: AtomicUsize::new(0),
    });
    let cache = Arc::new(InMemoryTagCache::new());
    let resolver = WorkspaceResolver::new(source.clone(), executor.clone(), cache.clone());

    Fixture {
        resolver,
        source,
        store,
        executor,
        cache,
    }
}

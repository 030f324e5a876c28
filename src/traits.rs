use crate::error::WorkspaceError;
use crate::query::ElementQuery;
use crate::types::{ResourceType, WorkspaceEntry};

/// Anything workspace permissions can be resolved for.
pub trait Principal {
    /// The principal's own id, matched against `principal_id` of direct entries.
    fn id(&self) -> i64;

    /// Ids of the roles the principal inherits workspace entries from.
    fn role_ids(&self) -> Vec<i64>;

    /// Administrators bypass workspace entries entirely. Default: not an administrator.
    fn is_admin(&self) -> bool {
        false
    }
}

/// Read access to raw workspace entries.
pub trait WorkspaceSource: Send + Sync {
    /// Return every entry of `resource_type` whose `principal_id` is one of
    /// `principal_ids`. Order is not significant.
    fn fetch(
        &self,
        resource_type: ResourceType,
        principal_ids: &[i64],
    ) -> Result<Vec<WorkspaceEntry>, WorkspaceError>;
}

/// Executes distinct-identifier queries built from a compiled condition.
pub trait ElementQueryExecutor: Send + Sync {
    /// Run `query` and return the selected ids in result order.
    fn fetch_ids(&self, query: &ElementQuery) -> Result<Vec<i64>, WorkspaceError>;
}

/// A cache store supporting invalidation by tag.
///
/// Errors are reported but never fatal to callers of the resolver; a failed
/// read is a miss and a failed write is dropped.
pub trait TagCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<i64>>, WorkspaceError>;

    fn set(&self, key: &str, value: Vec<i64>, tags: &[String]) -> Result<(), WorkspaceError>;

    /// Drop every entry carrying `tag`, returning how many were removed.
    fn invalidate_tag(&self, tag: &str) -> Result<usize, WorkspaceError>;
}

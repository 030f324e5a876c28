//! Raw workspace permission entries.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::resource_type::ResourceType;

/// One row of a `users_workspaces_<type>` relation.
///
/// `principal_id` is either a user id or a role id; the relation does not
/// distinguish the two.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct WorkspaceEntry {
    pub principal_id: i64,
    pub resource_type: ResourceType,
    /// Path prefix the entry applies to (the `cpath` column).
    pub path: String,
    /// `true` grants list visibility, `false` denies it.
    pub list_allowed: bool,
}

impl WorkspaceEntry {
    pub fn allow<P: Into<String>>(principal_id: i64, resource_type: ResourceType, path: P) -> Self {
        WorkspaceEntry {
            principal_id,
            resource_type,
            path: path.into(),
            list_allowed: true,
        }
    }

    pub fn deny<P: Into<String>>(principal_id: i64, resource_type: ResourceType, path: P) -> Self {
        WorkspaceEntry {
            principal_id,
            resource_type,
            path: path.into(),
            list_allowed: false,
        }
    }
}

//! Domain types for workspace resolution.
//!
//! Canonical string forms:
//! - User: `User::7` with optional roles `User::7[3,5]`, administrators `Admin::1`
//! - ResourceType: `object`, `asset`, `document`
//! - Paths: absolute, `/`-separated, e.g. `/catalog/archive`

mod config_workspace;
mod entry;
mod path_column;
mod path_set;
mod resource_type;
mod user;

pub use config_workspace::ConfigWorkspace;
pub use entry::WorkspaceEntry;
pub use path_column::PathColumn;
pub use path_set::{PathPermissionSet, ROOT_PATH};
pub use resource_type::ResourceType;
pub use user::User;

//! Resource types that carry their own workspace permission relation.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// The kind of element a workspace grants visibility on.
///
/// Each kind has its own permission relation, `users_workspaces_<kind>`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResourceType {
    Object,
    Asset,
    Document,
}

impl ResourceType {
    /// Name of the relation holding workspace entries for this resource type.
    pub fn workspace_table(&self) -> String {
        format!("users_workspaces_{}", self.as_ref())
    }
}

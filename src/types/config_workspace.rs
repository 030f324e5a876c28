//! Statically configured workspace restrictions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::WorkspaceError;

/// A workspace declared in configuration rather than stored per principal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct ConfigWorkspace {
    pub path: String,
    /// Missing means exclude.
    #[serde(default)]
    pub include: bool,
}

impl ConfigWorkspace {
    pub fn include<P: Into<String>>(path: P) -> Self {
        ConfigWorkspace {
            path: path.into(),
            include: true,
        }
    }

    pub fn exclude<P: Into<String>>(path: P) -> Self {
        ConfigWorkspace {
            path: path.into(),
            include: false,
        }
    }

    /// Parse a JSON array of `{ "path": ..., "include": ... }` items.
    pub fn list_from_json(json: &str) -> Result<Vec<ConfigWorkspace>, WorkspaceError> {
        Ok(serde_json::from_str(json)?)
    }
}

//! Resolver configuration.

use serde::{Deserialize, Serialize};

use crate::error::WorkspaceError;
use crate::query::validate_identifier;

/// Tunables for [`WorkspaceResolver`](crate::WorkspaceResolver).
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Alias of the element relation in identifier queries.
    pub element_alias: String,
    /// Alias used by the path column of config-workspace conditions. Empty
    /// means unqualified.
    pub config_column_alias: String,
    /// Id returned in place of an empty identifier list. Must never be a
    /// real element id.
    pub sentinel_id: i64,
    /// Tag attached to every cached identifier list.
    pub output_tag: String,
    /// Prefix of the per-principal tag, followed by the principal id.
    pub user_tag_prefix: String,
    /// Prefix of cache keys, followed by `<relation>_<principal id>`.
    pub cache_key_prefix: String,
    pub cache_enabled: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            element_alias: "o".to_string(),
            config_column_alias: String::new(),
            sentinel_id: -1,
            output_tag: "output".to_string(),
            user_tag_prefix: "user-".to_string(),
            cache_key_prefix: "workspace_condition_".to_string(),
            cache_enabled: true,
        }
    }
}

impl ResolverConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, WorkspaceError> {
        let config: ResolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WorkspaceError> {
        validate_identifier(&self.element_alias)?;
        if !self.config_column_alias.is_empty() {
            validate_identifier(&self.config_column_alias)?;
        }
        Ok(())
    }

    pub fn cache_key(&self, relation: &str, principal_id: i64) -> String {
        format!("{}{relation}_{principal_id}", self.cache_key_prefix)
    }

    pub fn user_tag(&self, principal_id: i64) -> String {
        format!("{}{principal_id}", self.user_tag_prefix)
    }

    pub fn cache_tags(&self, principal_id: i64) -> Vec<String> {
        vec![self.output_tag.clone(), self.user_tag(principal_id)]
    }
}

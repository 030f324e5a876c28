//! SQL expression that yields the full path of a row.

use serde::{Deserialize, Serialize};

use crate::error::WorkspaceError;
use crate::query::validate_identifier;

/// The column expression a compiled condition filters on.
///
/// Element tables store the parent folder in `path` and the element name in
/// `key`, so the full path is their concatenation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathColumn(String);

impl PathColumn {
    /// `CONCAT(<alias>.`path`, <alias>.`key`)`, or the unqualified form when
    /// `alias` is empty.
    pub fn for_alias(alias: &str) -> Result<Self, WorkspaceError> {
        if alias.is_empty() {
            return Ok(PathColumn("CONCAT(`path`, `key`)".to_string()));
        }
        validate_identifier(alias)?;
        Ok(PathColumn(format!("CONCAT({alias}.`path`, {alias}.`key`)")))
    }

    /// Use a caller-supplied expression verbatim. The expression is
    /// interpolated into SQL and must not contain untrusted input.
    pub fn raw<S: Into<String>>(expression: S) -> Self {
        PathColumn(expression.into())
    }

    pub fn expression(&self) -> &str {
        &self.0
    }
}

impl Default for PathColumn {
    fn default() -> Self {
        PathColumn("CONCAT(`path`, `key`)".to_string())
    }
}

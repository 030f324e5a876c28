use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::compiler::PathFilter;
use crate::condition::{Condition, Params};
use crate::error::WorkspaceError;
use crate::types::PathColumn;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("identifier pattern is valid")
});

/// Reject anything but a plain, optionally schema-qualified, SQL identifier.
/// Relation names and aliases are interpolated into SQL, never bound.
pub(crate) fn validate_identifier(name: &str) -> Result<(), WorkspaceError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(WorkspaceError::InvalidFormat(format!(
            "'{name}' is not a valid SQL identifier"
        )))
    }
}

/// A `SELECT DISTINCT id` over a relation, filtered by a workspace condition.
///
/// The query keeps the [`PathFilter`] it was rendered from, so executors
/// that do not speak SQL can evaluate it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementQuery {
    relation: String,
    alias: String,
    filter: PathFilter,
    condition: Condition,
}

impl ElementQuery {
    pub fn new<R, A>(relation: R, alias: A, filter: PathFilter) -> Result<Self, WorkspaceError>
    where
        R: Into<String>,
        A: Into<String>,
    {
        let relation = relation.into();
        let alias = alias.into();
        validate_identifier(&relation)?;
        validate_identifier(&alias)?;
        let condition = filter.render(&PathColumn::for_alias(&alias)?)?;
        Ok(ElementQuery {
            relation,
            alias,
            filter,
            condition,
        })
    }

    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn params(&self) -> &Params {
        self.condition.params()
    }

    pub fn to_sql(&self) -> String {
        format!(
            "SELECT DISTINCT {alias}.id AS id FROM {relation} {alias} WHERE ({condition})",
            alias = self.alias,
            relation = self.relation,
            condition = self.condition.query(),
        )
    }
}

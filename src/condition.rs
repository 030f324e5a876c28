//! Validated SQL condition value object.
//!
//! A [`Condition`] pairs a boolean query fragment with its bound parameters.
//! Construction is the only place the pair is checked, so every `Condition`
//! in circulation is structurally consistent:
//!
//! - neither the query nor the parameters are empty
//! - positional form: the number of `?` placeholders equals the parameter count
//! - named form: every parameter key appears as a `:key` placeholder

use std::collections::{BTreeMap, HashSet};
use std::fmt::{Display, Formatter, Result as FmtResult};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::WorkspaceError;

static NAMED_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").expect("placeholder pattern is valid")
});

/// A literal bound into a condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i64),
    Text(String),
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ParamValue::Integer(v) => write!(f, "{v}"),
            ParamValue::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

/// Parameters of a condition, either an ordered list for `?` binding or a
/// key/value map for `:key` binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    Positional(Vec<ParamValue>),
    Named(BTreeMap<String, ParamValue>),
}

impl Params {
    pub fn len(&self) -> usize {
        match self {
            Params::Positional(values) => values.len(),
            Params::Named(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a named parameter. Always `None` for positional parameters.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        match self {
            Params::Positional(_) => None,
            Params::Named(values) => values.get(key),
        }
    }
}

/// An immutable, validated SQL condition and its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    query: String,
    params: Params,
}

impl Condition {
    pub fn new<Q: Into<String>>(query: Q, params: Params) -> Result<Self, WorkspaceError> {
        let condition = Condition {
            query: query.into(),
            params,
        };
        condition.validate()?;
        Ok(condition)
    }

    pub fn positional<Q, I, V>(query: Q, params: I) -> Result<Self, WorkspaceError>
    where
        Q: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        Self::new(
            query,
            Params::Positional(params.into_iter().map(Into::into).collect()),
        )
    }

    pub fn named<Q, I, K, V>(query: Q, params: I) -> Result<Self, WorkspaceError>
    where
        Q: Into<String>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        Self::new(
            query,
            Params::Named(
                params
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        )
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn into_parts(self) -> (String, Params) {
        (self.query, self.params)
    }

    fn validate(&self) -> Result<(), WorkspaceError> {
        if self.query.trim().is_empty() || self.params.is_empty() {
            return Err(WorkspaceError::InvalidCondition(
                "query and params must not be empty".to_string(),
            ));
        }

        match &self.params {
            Params::Positional(values) => {
                let placeholders = self.query.matches('?').count();
                if placeholders != values.len() {
                    return Err(WorkspaceError::InvalidCondition(format!(
                        "placeholder count {placeholders} does not match param count {}",
                        values.len()
                    )));
                }
            }
            Params::Named(values) => {
                let placeholders: HashSet<&str> = NAMED_PLACEHOLDER
                    .captures_iter(&self.query)
                    .filter_map(|c| c.get(1).map(|m| m.as_str()))
                    .collect();
                let missing: Vec<&str> = values
                    .keys()
                    .map(|k| k.trim_start_matches(':'))
                    .filter(|k| !placeholders.contains(k))
                    .collect();
                if !missing.is_empty() {
                    return Err(WorkspaceError::InvalidCondition(format!(
                        "query must contain all param keys, missing: {}",
                        missing.join(", ")
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.query)
    }
}

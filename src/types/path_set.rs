//! Allowed and forbidden path sets produced by workspace aggregation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const ROOT_PATH: &str = "/";

/// Reduced workspace permissions for one principal and resource type.
///
/// Both sets are deduplicated and ordered so that compiling the same set
/// always produces the same condition. A path may appear in both sets when
/// two principals disagree about it; the compiler then treats the
/// forbidden entry as an exception to the allowed one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PathPermissionSet {
    allowed: BTreeSet<String>,
    forbidden: BTreeSet<String>,
}

impl PathPermissionSet {
    pub fn new<A, F, S>(allowed: A, forbidden: F) -> Self
    where
        A: IntoIterator<Item = S>,
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PathPermissionSet {
            allowed: allowed.into_iter().map(Into::into).collect(),
            forbidden: forbidden.into_iter().map(Into::into).collect(),
        }
    }

    /// Everything under the root is visible.
    pub fn full_access() -> Self {
        Self::new([ROOT_PATH], [])
    }

    pub fn allowed(&self) -> &BTreeSet<String> {
        &self.allowed
    }

    pub fn forbidden(&self) -> &BTreeSet<String> {
        &self.forbidden
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty() && self.forbidden.is_empty()
    }

    pub(crate) fn allow(&mut self, path: String) {
        self.allowed.insert(path);
    }

    pub(crate) fn forbid(&mut self, path: String) {
        self.forbidden.insert(path);
    }
}

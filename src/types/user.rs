//! Users with role membership.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::WorkspaceError;
use crate::traits::Principal;

/// A user principal and the roles it inherits workspaces from.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub struct User {
    id: i64,
    #[serde(default)]
    roles: BTreeSet<i64>,
    #[serde(default)]
    admin: bool,
}

impl User {
    /// Create a regular user with the given role ids.
    pub fn new<I: IntoIterator<Item = i64>>(id: i64, roles: I) -> Self {
        User {
            id,
            roles: roles.into_iter().collect(),
            admin: false,
        }
    }

    /// Create an administrator. Administrators see every path regardless
    /// of workspace entries.
    pub fn admin(id: i64) -> Self {
        User {
            id,
            roles: BTreeSet::new(),
            admin: true,
        }
    }

    pub fn roles(&self) -> &BTreeSet<i64> {
        &self.roles
    }
}

impl Principal for User {
    fn id(&self) -> i64 {
        self.id
    }

    fn role_ids(&self) -> Vec<i64> {
        self.roles.iter().copied().collect()
    }

    fn is_admin(&self) -> bool {
        self.admin
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let kind = if self.admin { "Admin" } else { "User" };
        write!(f, "{kind}::{}", self.id)
    }
}

/// Parses `User::7`, `User::7[3,5]` or `Admin::1`.
impl FromStr for User {
    type Err = WorkspaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            WorkspaceError::InvalidFormat(format!(
                "Failed to parse user '{s}' (expected format: User::id[role,role,...] or Admin::id)"
            ))
        };

        let (user_part, roles_part) = match s.find('[') {
            Some(idx) => {
                let (left, right) = s.split_at(idx);
                (left.trim(), Some(right.trim()))
            }
            None => (s.trim(), None),
        };

        let (kind, id) = user_part.split_once("::").ok_or_else(invalid)?;
        let id: i64 = id.trim().parse().map_err(|_| invalid())?;

        let roles = match roles_part {
            Some(roles) => {
                let inner = roles
                    .strip_prefix('[')
                    .and_then(|r| r.strip_suffix(']'))
                    .ok_or_else(invalid)?;
                inner
                    .split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(|r| r.parse::<i64>().map_err(|_| invalid()))
                    .collect::<Result<BTreeSet<_>, _>>()?
            }
            None => BTreeSet::new(),
        };

        match kind.trim() {
            "User" => Ok(User {
                id,
                roles,
                admin: false,
            }),
            "Admin" => Ok(User {
                id,
                roles,
                admin: true,
            }),
            _ => Err(invalid()),
        }
    }
}

//! Reduction of raw workspace entries into allowed and forbidden path sets.

use tracing::debug;

use crate::error::WorkspaceError;
use crate::traits::{Principal, WorkspaceSource};
use crate::types::{ConfigWorkspace, PathPermissionSet, ResourceType};

/// Collect the workspace paths `principal` may and may not list.
///
/// Direct entries are applied before role entries, so that a role deny on a
/// path the user explicitly allows can be skipped. No other ordering matters.
pub fn resolve_paths<P, S>(
    principal: &P,
    resource_type: ResourceType,
    source: &S,
) -> Result<PathPermissionSet, WorkspaceError>
where
    P: Principal + ?Sized,
    S: WorkspaceSource + ?Sized,
{
    if principal.is_admin() {
        debug!(
            event = "Resolve",
            phase = "Admin",
            principal = principal.id(),
            resource_type = resource_type.as_ref()
        );
        return Ok(PathPermissionSet::full_access());
    }

    let mut paths = PathPermissionSet::default();

    let direct = source.fetch(resource_type, &[principal.id()])?;
    for entry in direct {
        if entry.list_allowed {
            paths.allow(entry.path);
        } else {
            paths.forbid(entry.path);
        }
    }

    let role_ids = principal.role_ids();
    if !role_ids.is_empty() {
        // Only the user's own allows shadow role denies.
        let own_allowed = paths.allowed().clone();
        let inherited = source.fetch(resource_type, &role_ids)?;
        for entry in inherited {
            if entry.list_allowed {
                paths.allow(entry.path);
            } else if own_allowed.contains(&entry.path) {
                debug!(
                    event = "Resolve",
                    phase = "RoleDenyOverridden",
                    principal = principal.id(),
                    role = entry.principal_id,
                    path = %entry.path
                );
            } else {
                paths.forbid(entry.path);
            }
        }
    }

    debug!(
        event = "Resolve",
        phase = "Paths",
        principal = principal.id(),
        resource_type = resource_type.as_ref(),
        allowed = paths.allowed().len(),
        forbidden = paths.forbidden().len()
    );

    Ok(paths)
}

/// Map statically configured workspaces straight into path sets.
pub fn paths_from_config(workspaces: &[ConfigWorkspace]) -> PathPermissionSet {
    let mut paths = PathPermissionSet::default();
    for workspace in workspaces {
        if workspace.include {
            paths.allow(workspace.path.clone());
        } else {
            paths.forbid(workspace.path.clone());
        }
    }
    paths
}

//! Compilation of path permission sets into SQL conditions.
//!
//! Permissions are first turned into a [`PathFilter`] tree, which can be
//! evaluated in memory, and then rendered into a named-parameter
//! [`Condition`] over a [`PathColumn`].
//!
//! ## Shapes
//!
//! | Allowed paths | Filter |
//! |---------------|--------|
//! | none | AND of `NOT prefix(f)` over every forbidden path plus `/` |
//! | some | OR over allowed `a` of `prefix(a) AND (NOT prefix(f) ...)` for the forbidden `f` nested in `a` |
//!
//! ## Prefix matching
//!
//! A path `x` is under `p` when `x == p` or `x` starts with `p/`. The SQL form
//! appends `/` to both sides, `CONCAT(col, '/') LIKE 'p/%'`, so `/cat` never
//! matches `/category`. LIKE metacharacters in `p` are escaped.
//!
//! ## Parameter names
//!
//! Top-level slot `k` is `p<k>`; slot `j` nested under it is `p<k>_<j>`.
//! Names are unbounded.

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use crate::condition::{Condition, ParamValue, Params};
use crate::error::WorkspaceError;
use crate::types::{PathColumn, PathPermissionSet, ROOT_PATH};

/// Name of top-level parameter slot `index`.
pub fn slot_name(index: usize) -> String {
    format!("p{index}")
}

/// Name of slot `index` nested under the slot named `parent`.
pub fn nested_slot_name(parent: &str, index: usize) -> String {
    format!("{parent}_{index}")
}

/// Split a path into its non-empty segments.
fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Whether `path` is `ancestor` or lies below it, compared segment by segment.
pub fn is_nested(path: &str, ancestor: &str) -> bool {
    let mut path_segments = segments(path);
    segments(ancestor).all(|a| path_segments.next() == Some(a))
}

/// The LIKE pattern selecting `path` and everything below it, to be compared
/// against `CONCAT(col, '/')`.
pub fn like_prefix(path: &str) -> String {
    let mut pattern = String::with_capacity(path.len() + 2);
    for c in path.trim_end_matches('/').chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push_str("/%");
    pattern
}

/// A boolean filter over element paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PathFilter {
    /// The path is `path` or below it.
    Prefix { param: String, path: String },
    /// The path is neither `path` nor below it.
    NotPrefix { param: String, path: String },
    /// Every child matches.
    All(Vec<PathFilter>),
    /// At least one child matches.
    Any(Vec<PathFilter>),
}

impl PathFilter {
    /// Evaluate the filter against a full element path, with the same
    /// semantics as the rendered SQL.
    pub fn matches(&self, element_path: &str) -> bool {
        match self {
            PathFilter::Prefix { path, .. } => under(element_path, path),
            PathFilter::NotPrefix { path, .. } => !under(element_path, path),
            PathFilter::All(children) => children.iter().all(|c| c.matches(element_path)),
            PathFilter::Any(children) => children.iter().any(|c| c.matches(element_path)),
        }
    }

    /// Render into a named-parameter condition over `column`.
    pub fn render(&self, column: &PathColumn) -> Result<Condition, WorkspaceError> {
        let mut params = BTreeMap::new();
        let query = self.render_into(column, &mut params)?;
        Condition::new(query, Params::Named(params))
    }

    fn render_into(
        &self,
        column: &PathColumn,
        params: &mut BTreeMap<String, ParamValue>,
    ) -> Result<String, WorkspaceError> {
        let (param, path, operator) = match self {
            PathFilter::Prefix { param, path } => (param, path, "LIKE"),
            PathFilter::NotPrefix { param, path } => (param, path, "NOT LIKE"),
            PathFilter::All(children) => return render_junction(children, " AND ", column, params),
            PathFilter::Any(children) => return render_junction(children, " OR ", column, params),
        };

        if params
            .insert(param.clone(), ParamValue::Text(like_prefix(path)))
            .is_some()
        {
            return Err(WorkspaceError::InvalidCondition(format!(
                "parameter '{param}' bound twice"
            )));
        }
        Ok(format!(
            "CONCAT({}, '/') {operator} :{param}",
            column.expression()
        ))
    }
}

fn under(element_path: &str, path: &str) -> bool {
    let element = format!("{element_path}/");
    let prefix = format!("{}/", path.trim_end_matches('/'));
    element.starts_with(&prefix)
}

fn render_junction(
    children: &[PathFilter],
    separator: &str,
    column: &PathColumn,
    params: &mut BTreeMap<String, ParamValue>,
) -> Result<String, WorkspaceError> {
    if children.is_empty() {
        return Err(WorkspaceError::InvalidCondition(
            "cannot render an empty junction".to_string(),
        ));
    }
    if let [only] = children {
        return only.render_into(column, params);
    }

    let parts = children
        .iter()
        .map(|child| {
            let rendered = child.render_into(column, params)?;
            Ok(match child {
                PathFilter::All(c) | PathFilter::Any(c) if c.len() > 1 => format!("({rendered})"),
                _ => rendered,
            })
        })
        .collect::<Result<Vec<_>, WorkspaceError>>()?;

    Ok(parts.into_iter().join(separator))
}

/// Build the filter tree for a permission set.
pub fn build_filter(paths: &PathPermissionSet) -> PathFilter {
    if paths.allowed().is_empty() {
        // Nothing allowed: exclude the root as well, which denies everything.
        let forbidden = paths
            .forbidden()
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(ROOT_PATH))
            .unique();

        return PathFilter::All(
            forbidden
                .enumerate()
                .map(|(index, path)| PathFilter::NotPrefix {
                    param: slot_name(index),
                    path: path.to_string(),
                })
                .collect(),
        );
    }

    let branches = paths
        .allowed()
        .iter()
        .enumerate()
        .map(|(index, allowed)| {
            let param = slot_name(index);
            let exceptions: Vec<PathFilter> = paths
                .forbidden()
                .iter()
                .filter(|forbidden| is_nested(forbidden, allowed))
                .enumerate()
                .map(|(nested, forbidden)| PathFilter::NotPrefix {
                    param: nested_slot_name(&param, nested),
                    path: forbidden.clone(),
                })
                .collect();

            let prefix = PathFilter::Prefix {
                param,
                path: allowed.clone(),
            };
            if exceptions.is_empty() {
                prefix
            } else {
                PathFilter::All(vec![prefix, PathFilter::All(exceptions)])
            }
        })
        .collect();

    PathFilter::Any(branches)
}

/// Compile a permission set into a condition over `column`.
pub fn compile(paths: &PathPermissionSet, column: &PathColumn) -> Result<Condition, WorkspaceError> {
    let filter = build_filter(paths);
    let condition = filter.render(column)?;
    debug!(
        event = "Compile",
        phase = "Condition",
        allowed = paths.allowed().len(),
        forbidden = paths.forbidden().len(),
        params = condition.params().len(),
        query = condition.query()
    );
    Ok(condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use yare::parameterized;

    fn column() -> PathColumn {
        PathColumn::for_alias("o").unwrap()
    }

    #[parameterized(
        first = { 0, "p0" },
        twenty_sixth = { 26, "p26" },
        past_old_alphabet = { 52, "p52" },
        large = { 1000, "p1000" },
    )]
    fn test_slot_name(index: usize, expected: &str) {
        assert_eq!(slot_name(index), expected);
    }

    #[test]
    fn test_nested_slot_name() {
        assert_eq!(nested_slot_name(&slot_name(3), 1), "p3_1");
    }

    #[parameterized(
        child = { "/a/b", "/a", true },
        same = { "/a", "/a", true },
        trailing_slash = { "/a/b/", "/a/", true },
        under_root = { "/anything", "/", true },
        root_under_root = { "/", "/", true },
        sibling_prefix = { "/category", "/cat", false },
        parent = { "/a", "/a/b", false },
        unrelated = { "/b/a", "/a", false },
    )]
    fn test_is_nested(path: &str, ancestor: &str, expected: bool) {
        assert_eq!(is_nested(path, ancestor), expected);
    }

    #[parameterized(
        root = { "/", "/%" },
        plain = { "/catalog", "/catalog/%" },
        trailing_slash = { "/catalog/", "/catalog/%" },
        percent = { "/50%", "/50\\%/%" },
        underscore = { "/a_b", "/a\\_b/%" },
        backslash = { "/a\\b", "/a\\\\b/%" },
    )]
    fn test_like_prefix(path: &str, expected: &str) {
        assert_eq!(like_prefix(path), expected);
    }

    #[test]
    fn test_empty_set_denies_via_root() {
        let condition = compile(&PathPermissionSet::default(), &column()).unwrap();
        assert_snapshot!(condition.query(), @"CONCAT(CONCAT(o.`path`, o.`key`), '/') NOT LIKE :p0");
        assert_eq!(
            condition.params().get("p0"),
            Some(&ParamValue::Text("/%".to_string()))
        );
    }

    #[test]
    fn test_only_forbidden_adds_root() {
        let paths = PathPermissionSet::new(Vec::<String>::new(), vec!["/shop".to_string()]);
        let condition = compile(&paths, &PathColumn::default()).unwrap();
        assert_snapshot!(
            condition.query(),
            @"CONCAT(CONCAT(`path`, `key`), '/') NOT LIKE :p0 AND CONCAT(CONCAT(`path`, `key`), '/') NOT LIKE :p1"
        );
        assert_eq!(condition.params().get("p0"), Some(&ParamValue::from("/shop/%")));
        assert_eq!(condition.params().get("p1"), Some(&ParamValue::from("/%")));

        let filter = build_filter(&paths);
        for path in ["/", "/shop/x", "/other", "/shopping"] {
            assert!(!filter.matches(path), "{path} should be denied");
        }
    }

    #[test]
    fn test_forbidden_root_is_not_duplicated() {
        let paths = PathPermissionSet::new(Vec::<&str>::new(), vec!["/"]);
        let condition = compile(&paths, &column()).unwrap();
        assert_eq!(condition.params().len(), 1);
    }

    #[test]
    fn test_full_access() {
        let condition = compile(&PathPermissionSet::full_access(), &column()).unwrap();
        assert_snapshot!(condition.query(), @"CONCAT(CONCAT(o.`path`, o.`key`), '/') LIKE :p0");
        assert_eq!(condition.params().get("p0"), Some(&ParamValue::from("/%")));

        let filter = build_filter(&PathPermissionSet::full_access());
        for path in ["/", "/a", "/a/b/c"] {
            assert!(filter.matches(path));
        }
    }

    #[test]
    fn test_nested_exception() {
        let paths = PathPermissionSet::new(["/a"], ["/a/b"]);
        let condition = compile(&paths, &column()).unwrap();
        assert_snapshot!(
            condition.query(),
            @"CONCAT(CONCAT(o.`path`, o.`key`), '/') LIKE :p0 AND CONCAT(CONCAT(o.`path`, o.`key`), '/') NOT LIKE :p0_0"
        );

        let filter = build_filter(&paths);
        assert!(filter.matches("/a/x"));
        assert!(filter.matches("/a"));
        assert!(!filter.matches("/a/b/x"));
        assert!(!filter.matches("/a/b"));
        assert!(!filter.matches("/c"));
    }

    #[test]
    fn test_multiple_branches_with_exceptions() {
        let paths = PathPermissionSet::new(
            ["/catalog", "/media"],
            ["/catalog/archive", "/catalog/drafts", "/media/private", "/unrelated"],
        );
        let condition = compile(&paths, &PathColumn::raw("full_path")).unwrap();
        assert_snapshot!(
            condition.query(),
            @"(CONCAT(full_path, '/') LIKE :p0 AND (CONCAT(full_path, '/') NOT LIKE :p0_0 AND CONCAT(full_path, '/') NOT LIKE :p0_1)) OR (CONCAT(full_path, '/') LIKE :p1 AND CONCAT(full_path, '/') NOT LIKE :p1_0)"
        );
        let Params::Named(params) = condition.params() else {
            panic!("expected named params");
        };
        let keys: Vec<&str> = params.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["p0", "p0_0", "p0_1", "p1", "p1_0"]);
        assert_eq!(params["p0_1"], ParamValue::from("/catalog/drafts/%"));
    }

    #[test]
    fn test_branch_without_exceptions() {
        let paths = PathPermissionSet::new(["/a", "/b"], ["/b/x"]);
        let condition = compile(&paths, &PathColumn::raw("p")).unwrap();
        assert_snapshot!(
            condition.query(),
            @"CONCAT(p, '/') LIKE :p0 OR (CONCAT(p, '/') LIKE :p1 AND CONCAT(p, '/') NOT LIKE :p1_0)"
        );
    }

    #[test]
    fn test_sibling_prefix_is_not_an_exception() {
        let paths = PathPermissionSet::new(["/cat"], ["/category"]);
        let filter = build_filter(&paths);
        assert_eq!(
            filter,
            PathFilter::Any(vec![PathFilter::Prefix {
                param: "p0".to_string(),
                path: "/cat".to_string(),
            }])
        );
        assert!(filter.matches("/cat/tom"));
        assert!(!filter.matches("/category/tom"));
    }

    #[test]
    fn test_same_path_allowed_and_forbidden_denies() {
        let paths = PathPermissionSet::new(["/a"], ["/a"]);
        let filter = build_filter(&paths);
        assert!(!filter.matches("/a"));
        assert!(!filter.matches("/a/b"));
    }

    #[test]
    fn test_more_specific_allow_under_forbidden() {
        let paths = PathPermissionSet::new(["/a/b"], ["/a"]);
        let filter = build_filter(&paths);
        assert!(filter.matches("/a/b/c"));
        assert!(!filter.matches("/a/c"));
    }

    #[test]
    fn test_many_allowed_paths_are_unbounded() {
        let allowed: Vec<String> = (0..120).map(|i| format!("/folder{i:03}")).collect();
        let condition = compile(&PathPermissionSet::new(allowed, Vec::new()), &column()).unwrap();
        assert_eq!(condition.params().len(), 120);
        assert!(condition.params().get("p119").is_some());
    }

    #[test]
    fn test_render_empty_junction_fails() {
        assert!(matches!(
            PathFilter::All(vec![]).render(&column()),
            Err(WorkspaceError::InvalidCondition(_))
        ));
    }

    #[test]
    fn test_render_duplicate_param_fails() {
        let filter = PathFilter::Any(vec![
            PathFilter::Prefix {
                param: "p0".to_string(),
                path: "/a".to_string(),
            },
            PathFilter::Prefix {
                param: "p0".to_string(),
                path: "/b".to_string(),
            },
        ]);
        assert!(matches!(
            filter.render(&column()),
            Err(WorkspaceError::InvalidCondition(_))
        ));
    }
}

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::aggregator;
use crate::compiler;
use crate::condition::Condition;
use crate::config::ResolverConfig;
use crate::error::WorkspaceError;
use crate::metrics::{self, ResolutionPhases, ResolutionStats};
use crate::query::{ElementQuery, validate_identifier};
use crate::timers::{PhaseTimer, as_millis_f64};
use crate::traits::{ElementQueryExecutor, Principal, TagCache, WorkspaceSource};
use crate::types::{ConfigWorkspace, PathColumn, PathPermissionSet, ResourceType};

/// Resolves workspace permissions into conditions and cached element ids.
/// Cloneable and thread-safe.
#[derive(Clone)]
pub struct WorkspaceResolver {
    source: Arc<dyn WorkspaceSource>,
    executor: Arc<dyn ElementQueryExecutor>,
    cache: Arc<dyn TagCache>,
    config: Arc<ResolverConfig>,
}

impl WorkspaceResolver {
    pub fn new(
        source: Arc<dyn WorkspaceSource>,
        executor: Arc<dyn ElementQueryExecutor>,
        cache: Arc<dyn TagCache>,
    ) -> Self {
        WorkspaceResolver {
            source,
            executor,
            cache,
            config: Arc::new(ResolverConfig::default()),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Result<Self, WorkspaceError> {
        config.validate()?;
        self.config = Arc::new(config);
        Ok(self)
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The allowed and forbidden paths of `principal` for `resource_type`.
    pub fn resolve_paths<P: Principal + ?Sized>(
        &self,
        principal: &P,
        resource_type: ResourceType,
    ) -> Result<PathPermissionSet, WorkspaceError> {
        aggregator::resolve_paths(principal, resource_type, self.source.as_ref())
    }

    /// Condition restricting `column` to the paths `principal` may list.
    pub fn condition_for_user<P: Principal + ?Sized>(
        &self,
        principal: &P,
        resource_type: ResourceType,
        column: &PathColumn,
    ) -> Result<Condition, WorkspaceError> {
        let start = Instant::now();
        let paths = self.resolve_paths(principal, resource_type)?;
        let condition = compiler::compile(&paths, column)?;

        metrics::record_resolution(resolution_stats(
            start.elapsed(),
            principal,
            resource_type,
            &paths,
        ));
        Ok(condition)
    }

    /// Condition for statically configured workspaces.
    pub fn condition_for_config(
        &self,
        workspaces: &[ConfigWorkspace],
    ) -> Result<Condition, WorkspaceError> {
        let paths = aggregator::paths_from_config(workspaces);
        let column = PathColumn::for_alias(&self.config.config_column_alias)?;
        compiler::compile(&paths, &column)
    }

    /// Distinct ids of the elements in `relation` that `principal` may list.
    ///
    /// Results are cached per relation and principal until the principal's
    /// tag is invalidated. An empty result is returned, and cached, as a
    /// single sentinel id so it can be used in an `IN (...)` list as is.
    pub fn allowed_element_ids<P: Principal + ?Sized>(
        &self,
        principal: &P,
        relation: &str,
        resource_type: ResourceType,
    ) -> Result<Vec<i64>, WorkspaceError> {
        validate_identifier(relation)?;
        let principal_id = principal.id();
        let key = self.config.cache_key(relation, principal_id);

        if self.config.cache_enabled {
            if let Some(ids) = self.cached(&key) {
                metrics::record_cache_lookup(true, relation, principal_id);
                debug!(event = "Elements", phase = "CacheHit", key = key, count = ids.len());
                return Ok(ids);
            }
            metrics::record_cache_lookup(false, relation, principal_id);
        }

        let start = Instant::now();
        let mut resolve_time = Duration::ZERO;
        let mut compile_time = Duration::ZERO;
        let mut query_time = Duration::ZERO;

        let paths = {
            let _timer = PhaseTimer::new(&mut resolve_time);
            self.resolve_paths(principal, resource_type)?
        };

        let query = {
            let _timer = PhaseTimer::new(&mut compile_time);
            let filter = compiler::build_filter(&paths);
            ElementQuery::new(relation, self.config.element_alias.as_str(), filter)?
        };

        debug!(
            event = "Elements",
            phase = "Query",
            principal = principal_id,
            sql = query.to_sql()
        );

        let mut ids = {
            let _timer = PhaseTimer::new(&mut query_time);
            self.executor.fetch_ids(&query)?
        };

        if ids.is_empty() {
            ids.push(self.config.sentinel_id);
        }

        if self.config.cache_enabled {
            match self
                .cache
                .set(&key, ids.clone(), &self.config.cache_tags(principal_id))
            {
                Ok(()) => info!(event = "Elements", phase = "Cached", key = key, count = ids.len()),
                Err(err) => warn!(
                    event = "Elements",
                    phase = "CacheWrite",
                    key = key,
                    error = %err
                ),
            }
        }

        let total = start.elapsed();
        let stats = resolution_stats(total, principal, resource_type, &paths);
        metrics::record_resolution_phases(
            &stats,
            ResolutionPhases {
                resolve_paths_ms: as_millis_f64(resolve_time),
                compile_ms: as_millis_f64(compile_time),
                query_ms: as_millis_f64(query_time),
                total_ms: as_millis_f64(total),
            },
        );
        metrics::record_resolution(stats);

        Ok(ids)
    }

    /// Drop every cached result of `principal_id`. Intended for the code that
    /// changes workspace entries.
    pub fn invalidate_principal(&self, principal_id: i64) -> Result<usize, WorkspaceError> {
        self.cache.invalidate_tag(&self.config.user_tag(principal_id))
    }

    fn cached(&self, key: &str) -> Option<Vec<i64>> {
        match self.cache.get(key) {
            Ok(hit) => hit,
            Err(err) => {
                warn!(event = "Elements", phase = "CacheRead", key = key, error = %err);
                None
            }
        }
    }
}

fn resolution_stats<P: Principal + ?Sized>(
    duration: Duration,
    principal: &P,
    resource_type: ResourceType,
    paths: &PathPermissionSet,
) -> ResolutionStats {
    ResolutionStats {
        duration,
        principal_id: principal.id(),
        resource_type: resource_type.to_string(),
        admin: principal.is_admin(),
        allowed_paths: paths.allowed().len(),
        forbidden_paths: paths.forbidden().len(),
    }
}

#[cfg(test)]
mod tests;

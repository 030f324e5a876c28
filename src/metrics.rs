//! Vendor-agnostic metrics collection via a pluggable sink.
//!
//! The resolver reports every condition resolution and every identifier
//! cache lookup to a global [`MetricsSink`]. Without a sink installed the
//! events go to a no-op sink.
//!
//! ## Usage
//!
//! ```ignore
//! use pathgate_core::metrics::{CacheStats, MetricsSink, ResolutionStats};
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! struct HitCounter {
//!     hits: AtomicU64,
//! }
//!
//! impl MetricsSink for HitCounter {
//!     fn on_resolution(&self, _stats: &ResolutionStats) {}
//!
//!     fn on_cache_lookup(&self, stats: &CacheStats) {
//!         if stats.hit {
//!             self.hits.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//! }
//!
//! pathgate_core::metrics::set_sink(Arc::new(HitCounter { hits: AtomicU64::new(0) }));
//! ```

use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::warn;

/// Snapshot of one permission resolution, passed to [`MetricsSink::on_resolution`].
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionStats {
    /// Time spent aggregating entries and compiling the condition
    pub duration: Duration,
    pub principal_id: i64,
    /// Resource type name (e.g. "object")
    pub resource_type: String,
    /// Whether the administrator bypass was taken
    pub admin: bool,
    pub allowed_paths: usize,
    pub forbidden_paths: usize,
}

/// Per-phase timings of an identifier lookup that missed the cache, in
/// milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionPhases {
    pub resolve_paths_ms: f64,
    pub compile_ms: f64,
    pub query_ms: f64,
    pub total_ms: f64,
}

impl ResolutionPhases {
    /// Time not accounted for in the measured phases.
    pub fn overhead_ms(&self) -> f64 {
        self.total_ms - (self.resolve_paths_ms + self.compile_ms + self.query_ms)
    }
}

/// Outcome of an identifier cache lookup.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub hit: bool,
    pub relation: String,
    pub principal_id: i64,
}

/// Consumer of resolver metrics.
///
/// Called synchronously on the resolution path, possibly from many threads
/// at once; implementations must be cheap and thread-safe.
pub trait MetricsSink: Send + Sync {
    /// Called after every condition resolution, cached lookups excluded.
    fn on_resolution(&self, stats: &ResolutionStats);

    /// Called after every identifier cache lookup, hit or miss.
    fn on_cache_lookup(&self, stats: &CacheStats);

    /// Called with phase timings after an identifier lookup that missed the
    /// cache. Default: ignored.
    fn on_resolution_phases(&self, _stats: &ResolutionStats, _phases: &ResolutionPhases) {}
}

struct NoOpSink;

impl MetricsSink for NoOpSink {
    fn on_resolution(&self, _stats: &ResolutionStats) {}
    fn on_cache_lookup(&self, _stats: &CacheStats) {}
}

static SINK: OnceLock<Arc<dyn MetricsSink>> = OnceLock::new();

fn sink() -> Arc<dyn MetricsSink> {
    SINK.get_or_init(|| Arc::new(NoOpSink)).clone()
}

/// Set the global metrics sink.
///
/// Call this once at startup, before the first resolution. Later calls are
/// ignored with a warning.
pub fn set_sink(sink: Arc<dyn MetricsSink>) {
    if SINK.set(sink).is_err() {
        warn!(
            "Metrics sink was already initialized. Ignoring subsequent set_sink call. Set the sink before the first resolution."
        );
    }
}

pub(crate) fn record_resolution(stats: ResolutionStats) {
    sink().on_resolution(&stats);
}

pub(crate) fn record_resolution_phases(stats: &ResolutionStats, phases: ResolutionPhases) {
    sink().on_resolution_phases(stats, &phases);
}

pub(crate) fn record_cache_lookup(hit: bool, relation: &str, principal_id: i64) {
    sink().on_cache_lookup(&CacheStats {
        hit,
        relation: relation.to_string(),
        principal_id,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> ResolutionStats {
        ResolutionStats {
            duration: Duration::from_millis(42),
            principal_id: 7,
            resource_type: "object".to_string(),
            admin: false,
            allowed_paths: 2,
            forbidden_paths: 1,
        }
    }

    #[test]
    fn test_resolution_stats_serialization() {
        let json = serde_json::to_string(&stats()).unwrap();
        assert!(json.contains("\"principal_id\":7"));
        assert!(json.contains("\"resource_type\":\"object\""));
    }

    #[test]
    fn test_phases_overhead() {
        let phases = ResolutionPhases {
            resolve_paths_ms: 1.0,
            compile_ms: 0.5,
            query_ms: 2.0,
            total_ms: 4.0,
        };
        assert!((phases.overhead_ms() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_with_no_op_sink() {
        record_resolution(stats());
        record_cache_lookup(true, "objects", 7);
        record_resolution_phases(
            &stats(),
            ResolutionPhases {
                resolve_paths_ms: 0.0,
                compile_ms: 0.0,
                query_ms: 0.0,
                total_ms: 0.0,
            },
        );
    }
}

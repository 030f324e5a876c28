// src/lib.rs
pub use cache::InMemoryTagCache;
pub use compiler::{PathFilter, build_filter, compile};
pub use condition::{Condition, ParamValue, Params};
pub use config::ResolverConfig;
pub use error::WorkspaceError;
pub use memory::{InMemoryElementStore, InMemoryWorkspaceSource};
pub use query::ElementQuery;
pub use resolver::WorkspaceResolver;
pub use traits::{ElementQueryExecutor, Principal, TagCache, WorkspaceSource};
pub use types::{
    ConfigWorkspace, PathColumn, PathPermissionSet, ROOT_PATH, ResourceType, User, WorkspaceEntry,
};

pub mod aggregator;
mod cache;
pub mod compiler;
mod condition;
mod config;
mod error;
mod memory;
pub mod metrics;
mod query;
mod resolver;
mod timers;
mod traits;
pub mod types;

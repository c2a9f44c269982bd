//! Support bundle library for offline Kubernetes inspection
//!
//! This crate turns a captured support-bundle archive into a queryable
//! model of cluster state:
//! - Archive access over gzip-compressed tarballs
//! - `kubectl get` and `kubectl describe` text parsing
//! - Resource type resolution with abbreviations and fuzzy matching
//! - Node, pod, PVC/PV and generic resource views
//! - Container log filtering and field projection

pub mod archive;
pub mod error;
pub mod logs;
pub mod models;
pub mod observability;
pub mod parser;
pub mod resolver;
pub mod resources;

#[cfg(test)]
pub(crate) mod test_support;

pub use archive::{BundleSource, MemoryBundle, Scope, TarGzArchive};
pub use error::{BundleError, Result};
pub use logs::{LogFilter, LogLevel, LogQuery, LogRecord};
pub use models::*;
pub use observability::{BundleMetrics, StructuredLogger};
pub use resources::{
    ArchivedResource, EnvInfo, GenericResource, LogoAssets, NodeInfo, PodInfo, PvInfo, PvcInfo,
};

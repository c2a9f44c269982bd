//! Directory convention of the diagnostic collector
//!
//! ```text
//! kubernetes/<scope>/get/<type>.txt
//! kubernetes/<scope>/describe/<type>.txt
//! kubernetes/<scope>/json/<type>.json
//! kubernetes/<scope>/yaml/<type>.yaml
//! kubernetes/<namespace>/logs/<pod>_<container>.log
//! .get-k8s-info/get-k8s-info.log
//! ```

use serde::Serialize;
use std::fmt;

pub const KUBERNETES_ROOT: &str = "kubernetes";
pub const CLUSTERWIDE: &str = "clusterwide";

/// Where a resource type lives inside the bundle
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Clusterwide,
    Namespace(String),
}

impl Scope {
    pub fn namespace(name: impl Into<String>) -> Self {
        Scope::Namespace(name.into())
    }

    /// Directory name under `kubernetes/`
    pub fn dir_name(&self) -> &str {
        match self {
            Scope::Clusterwide => CLUSTERWIDE,
            Scope::Namespace(ns) => ns,
        }
    }

    /// Directory holding the `get` artifacts of this scope
    pub fn get_dir(&self) -> String {
        format!("{}/{}/get", KUBERNETES_ROOT, self.dir_name())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Conventional artifact paths for one resource type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    pub get: String,
    pub describe: String,
    pub json: String,
    pub yaml: String,
}

impl ArtifactPaths {
    pub fn new(scope: &Scope, resource_type: &str) -> Self {
        let base = format!("{}/{}", KUBERNETES_ROOT, scope.dir_name());
        Self {
            get: format!("{}/get/{}.txt", base, resource_type),
            describe: format!("{}/describe/{}.txt", base, resource_type),
            json: format!("{}/json/{}.json", base, resource_type),
            yaml: format!("{}/yaml/{}.yaml", base, resource_type),
        }
    }
}

/// Log artifact of one container
pub fn pod_log_path(namespace: &str, pod: &str, container: &str) -> String {
    format!(
        "{}/{}/logs/{}_{}.log",
        KUBERNETES_ROOT, namespace, pod, container
    )
}

/// Known locations of the environment summary log, most common first
pub fn env_log_candidates() -> [&'static str; 2] {
    [
        ".get-k8s-info/get-k8s-info.log",
        "get-k8s-info/get-k8s-info.log",
    ]
}

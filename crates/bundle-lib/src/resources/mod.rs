//! Resource views over a support bundle
//!
//! Every view shares one [`ResourceView`] that owns the resolved artifact
//! paths and knows how to read and parse them. The specialised views add
//! their own merging on top:
//! - [`EnvInfo`]: environment summary from the collector log
//! - [`NodeInfo`]: node manifest, describe metrics and get status
//! - [`PodInfo`]: containers, workload classes and container logs
//! - [`PvcInfo`] / [`PvInfo`]: claims joined to their bound volumes
//! - [`GenericResource`]: any resource type token
//!
//! Nothing is memoized; each call reads the bundle again.

mod env;
mod node;
mod pod;
mod pvc;


pub use env::{EnvInfo, ENV_PREFIXES};
pub use node::{kibibytes_to_gi, LogoAssets, NodeInfo, OS_LOGOS, WORKLOAD_CLASS_LABEL};
pub use pod::{no_logs_placeholder, PodInfo, UNDEFINED_WORKLOAD_CLASS};
pub use pvc::{PvInfo, PvcInfo};

use crate::archive::{BundleSource, Scope, TarGzArchive};
use crate::error::{BundleError, Result};
use crate::models::{DescribeSections, OrderedMap};
use crate::observability::BundleMetrics;
use crate::parser::{join_describe_with_names, parse_describe_output, parse_get_output, GetTable};
use crate::resolver::{available_resource_types, ResolvedResource, ResourceResolver};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared handle to an opened bundle
pub type SharedSource = Arc<dyn BundleSource>;

/// Open a bundle file as a shared source
pub fn open_bundle(path: impl AsRef<Path>) -> Result<SharedSource> {
    Ok(Arc::new(TarGzArchive::open(path.as_ref())?))
}

/// Resolution and parsing shared by all resource views
#[derive(Clone)]
pub struct ResourceView {
    source: SharedSource,
    resolved: ResolvedResource,
}

impl ResourceView {
    /// View for a type the caller already knows by its canonical name
    pub fn fixed(source: SharedSource, scope: Scope, resource_type: &str) -> Result<Self> {
        let resolved = ResolvedResource::fixed(source.as_ref(), scope, resource_type)?;
        Ok(Self { source, resolved })
    }

    /// View for a user-supplied token, resolved through the abbreviation
    /// table and fuzzy matching
    pub fn resolve(source: SharedSource, scope: Scope, token: &str) -> Result<Self> {
        let resolved = ResourceResolver::new(source.as_ref()).resolve(scope, token)?;
        Ok(Self { source, resolved })
    }

    pub fn source(&self) -> &dyn BundleSource {
        self.source.as_ref()
    }

    pub fn shared_source(&self) -> SharedSource {
        Arc::clone(&self.source)
    }

    pub fn resolved(&self) -> &ResolvedResource {
        &self.resolved
    }

    pub fn scope(&self) -> &Scope {
        &self.resolved.scope
    }

    pub fn resource_type(&self) -> &str {
        &self.resolved.resource_type
    }

    /// Parsed `get` artifact; empty when the artifact is absent
    pub fn get_table(&self) -> Result<GetTable> {
        Ok(self
            .source
            .read_text(&self.resolved.paths.get)?
            .map(|text| parse_get_output(&text))
            .unwrap_or_default())
    }

    /// Describe records keyed by the names of the `get` listing
    pub fn describe(&self) -> Result<OrderedMap<DescribeSections>> {
        let Some(text) = self.source.read_text(&self.resolved.paths.describe)? else {
            debug!(path = %self.resolved.paths.describe, "Describe artifact absent");
            return Ok(OrderedMap::new());
        };

        let names = self.get_table()?.names().to_vec();
        join_describe_with_names(self.resource_type(), &names, parse_describe_output(&text))
            .map_err(|e| {
                BundleMetrics::new().inc_data_inconsistencies();
                warn!(
                    resource_type = %self.resource_type(),
                    scope = %self.scope(),
                    error = %e,
                    "Describe records do not line up with get output"
                );
                e
            })
    }

    /// Manifest document, JSON preferred over YAML
    ///
    /// `Ok(None)` when neither artifact exists.
    pub fn manifest(&self) -> Result<Option<Value>> {
        let paths = &self.resolved.paths;
        if let Some(text) = self.source.read_text(&paths.json)? {
            return serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| BundleError::MalformedManifest {
                    path: paths.json.clone(),
                    reason: e.to_string(),
                });
        }
        if let Some(text) = self.source.read_text(&paths.yaml)? {
            return serde_yaml::from_str(&text)
                .map(Some)
                .map_err(|e| BundleError::MalformedManifest {
                    path: paths.yaml.clone(),
                    reason: e.to_string(),
                });
        }
        Ok(None)
    }

    /// Manifest document, failing when neither artifact exists
    pub fn require_manifest(&self) -> Result<Value> {
        self.manifest()?.ok_or_else(|| BundleError::ArtifactMissing {
            path: self.resolved.paths.json.clone(),
        })
    }
}

/// Operations every resource view exposes
pub trait ArchivedResource {
    fn view(&self) -> &ResourceView;

    /// Resource names in `get` order
    fn resource_names(&self) -> Result<Vec<String>> {
        Ok(self.view().get_table()?.names().to_vec())
    }

    /// The full `get` table
    fn resource_status(&self) -> Result<GetTable> {
        self.view().get_table()
    }

    /// Describe sections per resource name
    fn resource_describe(&self) -> Result<OrderedMap<DescribeSections>> {
        self.view().describe()
    }

    /// Resource types with a `get` artifact in this view's scope
    fn available_resource_types(&self) -> Vec<String> {
        available_resource_types(self.view().source(), self.view().scope())
    }
}

/// Scope of the environment namespace recorded in the bundle
pub fn namespace_scope(source: &dyn BundleSource) -> Result<Scope> {
    let env = EnvInfo::load(source)?;
    Ok(Scope::namespace(env.namespace()))
}

/// Items of a `kind: List` manifest
pub(crate) fn manifest_items(manifest: &Value) -> &[Value] {
    manifest
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Any resource type, by user-supplied token
#[derive(Clone)]
pub struct GenericResource {
    view: ResourceView,
}

impl GenericResource {
    /// Resolve a token in the environment namespace of a bundle file
    pub fn open(path: impl AsRef<Path>, token: &str) -> Result<Self> {
        Self::namespaced(open_bundle(path)?, token)
    }

    /// Resolve a token in the environment namespace
    pub fn namespaced(source: SharedSource, token: &str) -> Result<Self> {
        let scope = namespace_scope(source.as_ref())?;
        Ok(Self {
            view: ResourceView::resolve(source, scope, token)?,
        })
    }

    /// Resolve a token among the cluster-wide resource types
    pub fn clusterwide(source: SharedSource, token: &str) -> Result<Self> {
        Ok(Self {
            view: ResourceView::resolve(source, Scope::Clusterwide, token)?,
        })
    }

    pub fn resolved(&self) -> &ResolvedResource {
        self.view.resolved()
    }
}

impl ArchivedResource for GenericResource {
    fn view(&self) -> &ResourceView {
        &self.view
    }
}

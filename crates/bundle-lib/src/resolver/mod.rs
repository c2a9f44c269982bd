//! Resource type resolution
//!
//! Maps a user-supplied resource type token onto an artifact that actually
//! exists in the bundle, in this order:
//! 1. the kubectl abbreviation table (`po` -> `pods`)
//! 2. an exact artifact name under the scope's `get` directory
//! 3. the single closest artifact name scoring at least the cutoff

mod similarity;

pub use similarity::{SequenceRatio, SimilarityScorer};

use crate::archive::{ArtifactPaths, BundleSource, Scope};
use crate::error::{BundleError, Result};
use crate::observability::BundleMetrics;
use crate::parser::parse_get_output;
use serde::Serialize;
use tracing::{debug, info};

/// Minimum similarity for a fuzzy resource type match
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// kubectl short names and their canonical resource types
pub const K8S_ABBREVIATIONS: &[(&str, &str)] = &[
    ("po", "pods"),
    ("deploy", "deployments"),
    ("svc", "services"),
    ("ns", "namespaces"),
    ("cm", "configmaps"),
    ("sec", "secrets"),
    ("ing", "ingresses"),
    ("pv", "persistentvolumes"),
    ("pvc", "persistentvolumeclaims"),
    ("sts", "statefulsets"),
    ("ds", "daemonsets"),
    ("no", "nodes"),
    ("rs", "replicasets"),
    ("cj", "cronjobs"),
];

/// Canonical resource type for a kubectl abbreviation
pub fn expand_abbreviation(token: &str) -> Option<&'static str> {
    K8S_ABBREVIATIONS
        .iter()
        .find(|(short, _)| *short == token)
        .map(|(_, full)| *full)
}

/// Resource types with a `get` artifact in the given scope, in archive order
pub fn available_resource_types(source: &dyn BundleSource, scope: &Scope) -> Vec<String> {
    source
        .list_dir(&scope.get_dir())
        .iter()
        .filter(|path| !path.ends_with('/'))
        .filter_map(|path| {
            let file_name = path.rsplit('/').next()?;
            let stem = match file_name.rfind('.') {
                Some(idx) if idx > 0 => &file_name[..idx],
                _ => file_name,
            };
            Some(stem.to_string())
        })
        .collect()
}

/// How a token was turned into a resource type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeMatch {
    Abbreviation,
    Exact,
    Fuzzy { score: f64 },
    /// Type fixed by the caller, no lookup performed
    Fixed,
}

/// A resource type resolved against one bundle
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedResource {
    pub scope: Scope,
    pub requested: String,
    pub resource_type: String,
    pub matched_by: TypeMatch,
    pub paths: ArtifactPaths,
    /// Row names of the `get` artifact, empty when it is absent
    pub names: Vec<String>,
}

impl ResolvedResource {
    /// Resolve a type that is known to the caller
    pub fn fixed(source: &dyn BundleSource, scope: Scope, resource_type: &str) -> Result<Self> {
        Self::build(source, scope, resource_type, resource_type, TypeMatch::Fixed)
    }

    fn build(
        source: &dyn BundleSource,
        scope: Scope,
        requested: &str,
        resource_type: &str,
        matched_by: TypeMatch,
    ) -> Result<Self> {
        let paths = ArtifactPaths::new(&scope, resource_type);
        let names = source
            .read_text(&paths.get)?
            .map(|text| parse_get_output(&text).names().to_vec())
            .unwrap_or_default();

        Ok(Self {
            scope,
            requested: requested.to_string(),
            resource_type: resource_type.to_string(),
            matched_by,
            paths,
            names,
        })
    }
}

/// Resolves resource type tokens against a bundle's contents
pub struct ResourceResolver<'a> {
    source: &'a dyn BundleSource,
    scorer: Box<dyn SimilarityScorer>,
    cutoff: f64,
}

impl<'a> ResourceResolver<'a> {
    /// Create a resolver using the sequence ratio scorer and default cutoff
    pub fn new(source: &'a dyn BundleSource) -> Self {
        Self::with_scorer(source, Box::new(SequenceRatio), DEFAULT_CUTOFF)
    }

    /// Create a resolver with a custom scorer and cutoff
    pub fn with_scorer(
        source: &'a dyn BundleSource,
        scorer: Box<dyn SimilarityScorer>,
        cutoff: f64,
    ) -> Self {
        Self {
            source,
            scorer,
            cutoff,
        }
    }

    /// Turn a token into a resource type name without reading its artifacts
    pub fn resolve_type(&self, scope: &Scope, token: &str) -> Result<(String, TypeMatch)> {
        let token = token.trim();
        if token.is_empty() {
            return Err(BundleError::InvalidInput(
                "resource type must not be empty".to_string(),
            ));
        }

        if let Some(full) = expand_abbreviation(token) {
            debug!(token = %token, resource_type = %full, "Expanded resource type abbreviation");
            return Ok((full.to_string(), TypeMatch::Abbreviation));
        }

        let available = available_resource_types(self.source, scope);
        if available.iter().any(|t| t == token) {
            return Ok((token.to_string(), TypeMatch::Exact));
        }

        match self.best_match(token, &available) {
            Some((resource_type, score)) => {
                BundleMetrics::new().inc_type_substitutions();
                info!(
                    token = %token,
                    resource_type = %resource_type,
                    score = score,
                    scope = %scope,
                    "Resource type not in bundle, using closest match"
                );
                Ok((resource_type, TypeMatch::Fuzzy { score }))
            }
            None => Err(BundleError::ResourceTypeNotFound {
                token: token.to_string(),
                scope: scope.to_string(),
            }),
        }
    }

    /// Resolve a token and capture the artifact paths and row names
    pub fn resolve(&self, scope: Scope, token: &str) -> Result<ResolvedResource> {
        let (resource_type, matched_by) = self.resolve_type(&scope, token)?;
        ResolvedResource::build(self.source, scope, token.trim(), &resource_type, matched_by)
    }

    /// Highest scoring candidate at or above the cutoff
    ///
    /// Ties keep the candidate listed first in the bundle, not the
    /// lexicographically greatest name.
    pub fn best_match(&self, token: &str, candidates: &[String]) -> Option<(String, f64)> {
        let mut best: Option<(&String, f64)> = None;
        for candidate in candidates {
            let score = self.scorer.score(token, candidate);
            if score < self.cutoff {
                continue;
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((candidate, score));
            }
        }
        best.map(|(candidate, score)| (candidate.clone(), score))
    }
}

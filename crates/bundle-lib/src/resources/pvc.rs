//! Persistent volume claims and the cluster-wide volumes they bind

use super::{namespace_scope, open_bundle, ArchivedResource, ResourceView, SharedSource};
use crate::archive::Scope;
use crate::error::{BundleError, Result};
use crate::models::{DescribeSections, OrderedMap};
use crate::observability::BundleMetrics;
use std::path::Path;
use tracing::warn;

/// Column of the claim listing naming the bound volume
const VOLUME_COLUMN: &str = "VOLUME";

/// Cluster-wide persistent volumes
#[derive(Clone)]
pub struct PvInfo {
    view: ResourceView,
}

impl PvInfo {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_source(open_bundle(path)?)
    }

    pub fn from_source(source: SharedSource) -> Result<Self> {
        Ok(Self {
            view: ResourceView::fixed(source, Scope::Clusterwide, "persistentvolumes")?,
        })
    }
}

impl ArchivedResource for PvInfo {
    fn view(&self) -> &ResourceView {
        &self.view
    }
}

/// Claims of the environment namespace
#[derive(Clone)]
pub struct PvcInfo {
    view: ResourceView,
    volumes: PvInfo,
}

impl PvcInfo {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_source(open_bundle(path)?)
    }

    pub fn from_source(source: SharedSource) -> Result<Self> {
        let scope = namespace_scope(source.as_ref())?;
        Ok(Self {
            volumes: PvInfo::from_source(source.clone())?,
            view: ResourceView::fixed(source, scope, "persistentvolumeclaims")?,
        })
    }

    /// Claim name to bound volume name, for rows that list one
    pub fn volume_mapping(&self) -> Result<OrderedMap<String>> {
        Ok(self
            .resource_status()?
            .rows()
            .iter()
            .filter_map(|(claim, row)| Some((claim, row.get(VOLUME_COLUMN)?.clone())))
            .collect())
    }

    /// Describe sections of each claim's bound volume, keyed by claim name
    ///
    /// Every listed claim must name a volume that has a describe record.
    pub fn pv_describe(&self) -> Result<OrderedMap<DescribeSections>> {
        let volumes = self.volumes.resource_describe()?;
        let mapping = self.volume_mapping()?;

        let mut joined = OrderedMap::new();
        for claim in self.resource_names()? {
            let sections = mapping
                .get(&claim)
                .ok_or_else(|| format!("claim '{}' lists no bound volume", claim))
                .and_then(|volume| {
                    volumes.get(volume).ok_or_else(|| {
                        format!("volume '{}' of claim '{}' has no describe record", volume, claim)
                    })
                });

            match sections {
                Ok(sections) => {
                    joined.insert(claim, sections.clone());
                }
                Err(detail) => {
                    BundleMetrics::new().inc_data_inconsistencies();
                    warn!(claim = %claim, detail = %detail, "Claim cannot be joined to a volume");
                    return Err(BundleError::DataInconsistency(detail));
                }
            }
        }
        Ok(joined)
    }
}

impl ArchivedResource for PvcInfo {
    fn view(&self) -> &ResourceView {
        &self.view
    }
}

//! CLI command implementations

pub mod env;
pub mod nodes;
pub mod pods;
pub mod pvc;
pub mod resource;

use anyhow::{Context, Result};
use bundle_lib::resources::{open_bundle, SharedSource};
use bundle_lib::LogoAssets;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::output::OutputFormat;

/// An opened bundle plus the presentation settings of this invocation
pub struct BundleContext {
    pub source: SharedSource,
    pub logos: LogoAssets,
    pub format: OutputFormat,
}

impl BundleContext {
    pub fn open(archive: &Path, assets_dir: PathBuf, format: OutputFormat) -> Result<Self> {
        debug!(archive = %archive.display(), "opening bundle");
        let source = open_bundle(archive)
            .with_context(|| format!("cannot open bundle {}", archive.display()))?;
        Ok(Self {
            source,
            logos: LogoAssets::new(assets_dir),
            format,
        })
    }
}

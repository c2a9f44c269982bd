//! Service configuration

use anyhow::{Context, Result};
use bundle_lib::{BundleError, LogLevel, LogoAssets};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Port the HTTP API listens on
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Directory uploaded bundles are stored in
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Directory holding the OS logo images
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Minimum log level when a log query names none
    #[serde(default = "default_log_level")]
    pub default_log_level: String,
}

fn default_api_port() -> u16 {
    5000
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("/tmp")
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            upload_dir: default_upload_dir(),
            assets_dir: default_assets_dir(),
            default_log_level: default_log_level(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from an optional `bundle-api.*` file and
    /// `BUNDLE_*` environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("bundle-api").required(false))
            .add_source(config::Environment::with_prefix("BUNDLE").try_parsing(true))
            .build()
            .context("failed to read configuration")?;

        let config: ApiConfig = config
            .try_deserialize()
            .context("invalid configuration")?;
        config
            .default_log_level
            .parse::<LogLevel>()
            .context("invalid default_log_level")?;
        Ok(config)
    }

    /// Location of a bundle named by a request
    ///
    /// Relative names are looked up in the upload directory.
    pub fn resolve_archive(&self, file_name: &str) -> bundle_lib::Result<PathBuf> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(BundleError::InvalidInput(
                "file_name must not be empty".to_string(),
            ));
        }

        let path = Path::new(file_name);
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.upload_dir.join(path))
        }
    }

    pub fn logos(&self) -> LogoAssets {
        LogoAssets::new(&self.assets_dir)
    }

    /// True when bundles can be served, i.e. the upload directory exists
    pub fn is_ready(&self) -> bool {
        self.upload_dir.is_dir()
    }
}

//! Environment summary from the collector's own log

use crate::archive::{env_log_candidates, BundleSource};
use crate::error::{BundleError, Result};
use crate::models::OrderedMap;
use serde::Serialize;
use tracing::debug;

/// Line prefixes recognised in the collector log and the key each one sets
pub const ENV_PREFIXES: &[(&str, &str)] = &[
    ("Namespace:", "namespace"),
    ("USER_NS:", "namespace"),
    ("Version:", "version"),
    ("Order:", "order"),
    ("Site Number:", "site_number"),
    ("License Expires:", "license_expires"),
    ("CAS Mode:", "cas_mode"),
    ("CAS Disk Cache:", "cas_disk_cache"),
    ("SAS Work", "sas_work"),
    ("PostgreSQL Database:", "postgresql_db"),
    ("TLS Mode:", "tls_mode"),
    ("Certificate Generator:", "cert_generator"),
    ("Ingress Host:", "ingress_host"),
    ("Ingress Certificate:", "ingress_cert"),
];

/// Well-known environment facts of the captured deployment
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct EnvInfo {
    values: OrderedMap<String>,
}

impl EnvInfo {
    /// Read the collector log and extract the environment keys
    ///
    /// Fails with [`BundleError::InvalidArchive`] when no namespace is
    /// recorded, since every namespaced lookup depends on it.
    pub fn load(source: &dyn BundleSource) -> Result<Self> {
        let mut content = None;
        for candidate in env_log_candidates() {
            if let Some(text) = source.read_text(candidate)? {
                debug!(path = %candidate, "Found environment log");
                content = Some(text);
                break;
            }
        }

        let text = content.ok_or_else(|| {
            BundleError::InvalidArchive("environment log get-k8s-info.log not found".to_string())
        })?;
        let env = Self::parse(&text);
        if !env.values.contains_key("namespace") {
            return Err(BundleError::InvalidArchive(
                "environment log records no namespace".to_string(),
            ));
        }
        Ok(env)
    }

    /// Extract keys line by line; the first value seen for a key wins
    ///
    /// The value is the text after the first colon, or the whole line when
    /// the line has none.
    pub fn parse(text: &str) -> Self {
        let mut values = OrderedMap::new();
        for line in text.lines() {
            let matched = ENV_PREFIXES
                .iter()
                .find(|(prefix, key)| line.starts_with(*prefix) && !values.contains_key(key));
            if let Some((_, key)) = matched {
                let value = line.split_once(':').map_or(line, |(_, v)| v);
                values.insert(*key, value.trim().to_string());
            }
        }
        Self { values }
    }

    pub fn namespace(&self) -> &str {
        self.get("namespace").unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn values(&self) -> &OrderedMap<String> {
        &self.values
    }
}

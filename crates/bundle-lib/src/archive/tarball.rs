//! gzip-compressed tarball bundles
//!
//! Opening a bundle reads the member index once. Each content read then
//! streams the archive again from the start, so a handle holds no open
//! file between calls and several requests may read the same bundle
//! concurrently.

use super::{find_member, BundleSource};
use crate::error::{BundleError, Result};
use crate::observability::BundleMetrics;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tar::Archive;
use tracing::{debug, info};

type TarStream = Archive<GzDecoder<BufReader<File>>>;

/// Bundle backed by a `.tgz` file on disk
#[derive(Debug, Clone)]
pub struct TarGzArchive {
    path: PathBuf,
    members: Vec<String>,
}

impl TarGzArchive {
    /// Open a bundle and index its members
    ///
    /// Fails with [`BundleError::ArchiveUnreadable`] when the file is
    /// missing or is not a readable gzip tarball.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let started = Instant::now();

        let mut archive = Self::stream(&path)?;
        let mut members = Vec::new();
        let entries = archive
            .entries()
            .map_err(|e| BundleError::unreadable(&path, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| BundleError::unreadable(&path, e))?;
            members.push(String::from_utf8_lossy(&entry.path_bytes()).into_owned());
        }

        let elapsed = started.elapsed();
        BundleMetrics::new().observe_archive_open_latency(elapsed.as_secs_f64());
        info!(
            archive = %path.display(),
            members = members.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Indexed support bundle"
        );

        Ok(Self { path, members })
    }

    /// Location of the bundle on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn stream(path: &Path) -> Result<TarStream> {
        let file = File::open(path).map_err(|e| BundleError::unreadable(path, e))?;
        Ok(Archive::new(GzDecoder::new(BufReader::new(file))))
    }

    /// Content of the member indexed as `stored_name`
    ///
    /// Names are compared in the same lossy UTF-8 form the index holds, so
    /// members with non-UTF-8 names stay readable.
    fn read_member(&self, stored_name: &str) -> Result<Option<Vec<u8>>> {
        let mut archive = Self::stream(&self.path)?;
        let entries = archive
            .entries()
            .map_err(|e| BundleError::unreadable(&self.path, e))?;

        for entry in entries {
            let mut entry = entry.map_err(|e| BundleError::unreadable(&self.path, e))?;
            if String::from_utf8_lossy(&entry.path_bytes()) != stored_name {
                continue;
            }
            let mut content = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut content)
                .map_err(|e| BundleError::unreadable(&self.path, e))?;
            return Ok(Some(content));
        }

        Ok(None)
    }
}

impl BundleSource for TarGzArchive {
    fn member_names(&self) -> &[String] {
        &self.members
    }

    fn read_text(&self, member: &str) -> Result<Option<String>> {
        let Some(stored_name) = find_member(&self.members, member) else {
            debug!(archive = %self.path.display(), member = %member, "Member not found");
            return Ok(None);
        };

        BundleMetrics::new().inc_member_reads();
        let content = self.read_member(stored_name)?;
        Ok(content.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }
}

//! Read-only access to support bundle archives
//!
//! A bundle is a gzip-compressed tarball whose members follow the
//! collector's directory convention (see [`layout`]). Member paths are
//! matched with or without a leading `./` marker, since collectors differ
//! in whether they store it.

mod layout;
mod memory;
mod tarball;

#[cfg(test)]
mod tests;

pub use layout::{
    env_log_candidates, pod_log_path, ArtifactPaths, Scope, CLUSTERWIDE, KUBERNETES_ROOT,
};
pub use memory::MemoryBundle;
pub use tarball::TarGzArchive;

use crate::error::Result;

/// Read operations every bundle source provides
pub trait BundleSource: Send + Sync {
    /// All member paths, in archive order
    fn member_names(&self) -> &[String];

    /// Read a member as text. `Ok(None)` means the member is absent.
    fn read_text(&self, member: &str) -> Result<Option<String>>;

    /// Test whether a member exists
    fn exists(&self, member: &str) -> bool {
        find_member(self.member_names(), member).is_some()
    }

    /// List every member below a directory, excluding the directory entry itself
    fn list_dir(&self, dir: &str) -> Vec<String> {
        let prefix = format!("{}/", strip_current_dir(dir).trim_matches('/'));
        self.member_names()
            .iter()
            .filter(|name| {
                let normalized = strip_current_dir(name);
                normalized.starts_with(&prefix) && normalized != prefix
            })
            .cloned()
            .collect()
    }
}

/// Remove any leading `./` markers from a member path
pub fn strip_current_dir(path: &str) -> &str {
    let mut path = path;
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path
}

/// Locate the stored name for a requested member path
///
/// Tries the path verbatim first, then with the `./` marker stripped, then
/// with the marker added.
pub(crate) fn find_member<'a>(names: &'a [String], member: &str) -> Option<&'a str> {
    let stripped = strip_current_dir(member);
    let prefixed = format!("./{}", stripped);
    let found = [member, stripped, prefixed.as_str()]
        .into_iter()
        .find_map(|candidate| names.iter().find(|n| n.as_str() == candidate))
        .map(String::as_str);
    found
}

//! In-memory bundle source

use super::{find_member, BundleSource};
use crate::error::Result;

/// Bundle held entirely in memory
///
/// Useful for embedding callers that already hold the extracted members
/// and for exercising the composers without building tarballs.
#[derive(Debug, Clone, Default)]
pub struct MemoryBundle {
    names: Vec<String>,
    contents: Vec<String>,
}

impl MemoryBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member, replacing any existing member with the same stored name
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into();
        let content = content.into();
        match self.names.iter().position(|n| *n == path) {
            Some(idx) => self.contents[idx] = content,
            None => {
                self.names.push(path);
                self.contents.push(content);
            }
        }
    }
}

impl BundleSource for MemoryBundle {
    fn member_names(&self) -> &[String] {
        &self.names
    }

    fn read_text(&self, member: &str) -> Result<Option<String>> {
        Ok(find_member(&self.names, member).and_then(|stored| {
            self.names
                .iter()
                .position(|n| n == stored)
                .map(|idx| self.contents[idx].clone())
        }))
    }
}

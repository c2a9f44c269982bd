//! Core data models for support bundle inspection

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Insertion-ordered string-keyed map
///
/// `kubectl` output is inherently ordered (rows, columns, describe
/// sections) and callers render it in that order, so the parsed views keep
/// it. Inserting an existing key replaces the value in place. Lookups go
/// through a key index, so listings with many thousands of rows stay linear
/// to build.
#[derive(Debug, Clone)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V: PartialEq> PartialEq for OrderedMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&slot) => Some(std::mem::replace(&mut self.entries[slot].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let slot = *self.index.get(key)?;
        Some(&mut self.entries[slot].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> IntoIterator for OrderedMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// One resource's describe output split by top-level section
pub type DescribeSections = OrderedMap<String>;

/// Scheduling pressure of a node from its describe "Allocated resources" table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeResources {
    pub non_terminated_pods: String,
    pub cpu_requests: String,
    pub cpu_requests_pct: String,
    pub cpu_limits: String,
    pub cpu_limits_pct: String,
    pub memory_requests: String,
    pub memory_requests_pct: String,
    pub memory_limits: String,
    pub memory_limits_pct: String,
}

/// Placeholder for metrics a describe block did not provide
pub const NO_DATA: &str = "N/A";

impl NodeResources {
    /// Record used for nodes without a describe block
    pub fn unavailable() -> Self {
        Self {
            non_terminated_pods: NO_DATA.to_string(),
            cpu_requests: NO_DATA.to_string(),
            cpu_requests_pct: NO_DATA.to_string(),
            cpu_limits: NO_DATA.to_string(),
            cpu_limits_pct: NO_DATA.to_string(),
            memory_requests: NO_DATA.to_string(),
            memory_requests_pct: NO_DATA.to_string(),
            memory_limits: NO_DATA.to_string(),
            memory_limits_pct: NO_DATA.to_string(),
        }
    }
}

impl Default for NodeResources {
    fn default() -> Self {
        Self::unavailable()
    }
}

/// Composite node view merged from manifest, describe and get output
#[derive(Debug, Clone, Serialize)]
pub struct NodeStatus {
    pub annotations: Value,
    pub labels: Value,
    pub taints: Value,
    pub ip: String,
    pub workload_class: String,
    pub allocatable_pods: String,
    pub cpu_allocatable: String,
    pub cpu_capacity: String,
    pub memory_allocatable: String,
    pub memory_allocatable_gi: String,
    pub memory_capacity: String,
    pub memory_capacity_gi: String,
    pub os_image: String,
    pub os_image_logo: String,
    pub resources: NodeResources,
    /// Columns of the node's `kubectl get nodes` row, empty if absent
    pub status: OrderedMap<String>,
}

/// Container status objects of one pod, keyed by container name
#[derive(Debug, Clone, Default, Serialize)]
pub struct PodContainers {
    pub init_containers: OrderedMap<Value>,
    pub containers: OrderedMap<Value>,
}

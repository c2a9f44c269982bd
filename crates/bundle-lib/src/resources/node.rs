//! Cluster nodes: manifest fields merged with describe metrics and get status

use super::{manifest_items, open_bundle, ArchivedResource, ResourceView, SharedSource};
use crate::archive::Scope;
use crate::error::Result;
use crate::models::{NodeResources, NodeStatus, OrderedMap};
use crate::parser::split_describe_blocks;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Label carrying the workload class of nodes and pods
pub const WORKLOAD_CLASS_LABEL: &str = "workload.sas.com/class";

/// OS image substrings and the logo file shown for them
pub const OS_LOGOS: &[(&str, &str)] = &[
    ("Amazon", "amazon_linux.png"),
    ("Red Hat", "rhel.png"),
    ("Ubuntu", "ubuntu.png"),
    ("Photon", "vmware_photon.png"),
];

const DEFAULT_LOGO: &str = "default.png";

/// Directory holding the OS logo images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoAssets {
    dir: PathBuf,
}

impl Default for LogoAssets {
    fn default() -> Self {
        Self::new("assets")
    }
}

impl LogoAssets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Logo path for an OS image, falling back to the default logo
    ///
    /// When several table entries occur in the image name, the one listed
    /// last wins.
    pub fn logo_for(&self, os_image: &str) -> String {
        let file = OS_LOGOS
            .iter()
            .rev()
            .find(|(needle, _)| os_image.contains(*needle))
            .map(|(_, file)| *file)
            .unwrap_or(DEFAULT_LOGO);
        self.dir.join(file).display().to_string()
    }
}

/// Node view over the cluster-wide `nodes` artifacts
#[derive(Clone)]
pub struct NodeInfo {
    view: ResourceView,
    logos: LogoAssets,
}

impl NodeInfo {
    pub fn open(path: impl AsRef<Path>, logos: LogoAssets) -> Result<Self> {
        Self::from_source(open_bundle(path)?, logos)
    }

    pub fn from_source(source: SharedSource, logos: LogoAssets) -> Result<Self> {
        Ok(Self {
            view: ResourceView::fixed(source, Scope::Clusterwide, "nodes")?,
            logos,
        })
    }

    /// Composite status of every node in the manifest, in manifest order
    ///
    /// Fails when neither the JSON nor the YAML node manifest exists.
    /// Nodes without a describe block get [`NodeResources::unavailable`],
    /// nodes without a get row get an empty status map.
    pub fn node_status(&self) -> Result<OrderedMap<NodeStatus>> {
        let manifest = self.view.require_manifest()?;
        let resources = self.node_resources()?;
        let table = self.view.get_table()?;

        let mut nodes = OrderedMap::new();
        for item in manifest_items(&manifest) {
            let name = text_at(item, "/metadata/name", "Node name unavailable");
            let labels = item
                .pointer("/metadata/labels")
                .cloned()
                .unwrap_or_else(|| Value::from("Node labels unavailable"));
            let workload_class = labels
                .get(WORKLOAD_CLASS_LABEL)
                .and_then(Value::as_str)
                .unwrap_or("Node workload class unavailable")
                .to_string();
            let memory_allocatable = text_at(
                item,
                "/status/allocatable/memory",
                "Allocatable node memory unavailable",
            );
            let memory_capacity = text_at(
                item,
                "/status/capacity/memory",
                "Node memory capacity unavailable",
            );
            let os_image = text_at(item, "/status/nodeInfo/osImage", "Node OS image unavailable");

            let status = NodeStatus {
                annotations: item
                    .pointer("/metadata/annotations")
                    .cloned()
                    .unwrap_or_else(|| Value::from("Node annotation unavailable")),
                taints: item
                    .pointer("/spec/taints")
                    .cloned()
                    .unwrap_or_else(|| Value::from("Node taints unavailable")),
                ip: text_at(item, "/status/addresses/0/address", "Node ip unavailable"),
                workload_class,
                allocatable_pods: text_at(
                    item,
                    "/status/allocatable/pods",
                    "Allocatable pods unavailable",
                ),
                cpu_allocatable: text_at(
                    item,
                    "/status/allocatable/cpu",
                    "Allocatable node CPU unavailable",
                ),
                cpu_capacity: text_at(item, "/status/capacity/cpu", "Node CPU capacity unavailable"),
                memory_allocatable_gi: kibibytes_to_gi(&memory_allocatable),
                memory_allocatable,
                memory_capacity_gi: kibibytes_to_gi(&memory_capacity),
                memory_capacity,
                os_image_logo: self.logos.logo_for(&os_image),
                os_image,
                resources: resources.get(&name).cloned().unwrap_or_default(),
                status: table.row(&name).cloned().unwrap_or_default(),
                labels,
            };
            nodes.insert(name, status);
        }

        Ok(nodes)
    }

    /// Scheduling pressure per node, keyed by each describe block's own name
    pub fn node_resources(&self) -> Result<OrderedMap<NodeResources>> {
        let Some(text) = self.view.source().read_text(&self.view.resolved().paths.describe)?
        else {
            return Ok(OrderedMap::new());
        };

        Ok(split_describe_blocks(&text)
            .iter()
            .filter_map(|block| parse_node_resources(block))
            .collect())
    }
}

impl ArchivedResource for NodeInfo {
    fn view(&self) -> &ResourceView {
        &self.view
    }
}

/// String at a JSON pointer, or the placeholder
///
/// Numbers and booleans are rendered as text so YAML manifests with
/// unquoted quantities read the same as JSON ones.
fn text_at(item: &Value, pointer: &str, placeholder: &str) -> String {
    match item.pointer(pointer) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => placeholder.to_string(),
    }
}

/// Whole gibibytes in a kibibyte quantity such as `32901508Ki`
///
/// Takes the first run of digits and floors the division by 1024².
pub fn kibibytes_to_gi(quantity: &str) -> String {
    let digits: String = quantity
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    match digits.parse::<u64>() {
        Ok(kib) => format!("{} Gi", kib / (1024 * 1024)),
        Err(_) => "unavailable".to_string(),
    }
}

/// Metrics of one node describe block, `None` when the block has no name
fn parse_node_resources(block: &str) -> Option<(String, NodeResources)> {
    let mut name = None;
    let mut resources = NodeResources::unavailable();

    for line in block.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if line.starts_with("Name:") {
            name = tokens.get(1).map(|s| s.to_string());
        } else if line.starts_with("Non-terminated Pods:") {
            if let Some(count) = tokens.get(2) {
                resources.non_terminated_pods = count.trim_start_matches('(').to_string();
            }
        } else if line.starts_with("  cpu ") && tokens.len() >= 5 {
            resources.cpu_requests = tokens[1].to_string();
            resources.cpu_requests_pct = strip_parens(tokens[2]);
            resources.cpu_limits = tokens[3].to_string();
            resources.cpu_limits_pct = strip_parens(tokens[4]);
        } else if line.starts_with("  memory ") && tokens.len() >= 5 {
            resources.memory_requests = tokens[1].to_string();
            resources.memory_requests_pct = strip_parens(tokens[2]);
            resources.memory_limits = tokens[3].to_string();
            resources.memory_limits_pct = strip_parens(tokens[4]);
        }
    }

    name.map(|name| (name, resources))
}

fn strip_parens(token: &str) -> String {
    token.trim_matches(|c| c == '(' || c == ')').to_string()
}

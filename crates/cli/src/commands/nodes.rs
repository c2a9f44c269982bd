//! Node commands

use anyhow::{bail, Result};
use tabled::Tabled;

use super::BundleContext;
use crate::output::{color_status, print_describe, print_get_table, print_json, print_names, print_table, OutputFormat};
use bundle_lib::{ArchivedResource, NodeInfo, OrderedMap};

/// Row for the node status table
#[derive(Tabled, serde::Serialize)]
struct NodeRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Class")]
    workload_class: String,
    #[tabled(rename = "OS")]
    os_image: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "CPU Req")]
    cpu_requests: String,
    #[tabled(rename = "Mem Req")]
    memory_requests: String,
}

fn node_info(ctx: &BundleContext) -> Result<NodeInfo> {
    Ok(NodeInfo::from_source(ctx.source.clone(), ctx.logos.clone())?)
}

/// Show the merged node status
pub fn show_status(ctx: &BundleContext) -> Result<()> {
    let status = node_info(ctx)?.node_status()?;

    if ctx.format == OutputFormat::Json {
        return print_json(&status);
    }

    let rows: Vec<NodeRow> = status
        .iter()
        .map(|(name, node)| NodeRow {
            name: name.to_string(),
            status: color_status(node.status.get("STATUS").map(String::as_str).unwrap_or("-")),
            workload_class: node.workload_class.clone(),
            os_image: node.os_image.clone(),
            cpu: format!("{} / {}", node.cpu_allocatable, node.cpu_capacity),
            memory: format!("{} / {}", node.memory_allocatable_gi, node.memory_capacity_gi),
            cpu_requests: format!(
                "{} ({})",
                node.resources.cpu_requests, node.resources.cpu_requests_pct
            ),
            memory_requests: format!(
                "{} ({})",
                node.resources.memory_requests, node.resources.memory_requests_pct
            ),
        })
        .collect();
    print_table(&rows, OutputFormat::Table)
}

/// List node names
pub fn list_names(ctx: &BundleContext) -> Result<()> {
    print_names(&node_info(ctx)?.resource_names()?, ctx.format)
}

/// Show describe output, optionally for a single node
pub fn describe(ctx: &BundleContext, name: Option<&str>) -> Result<()> {
    let records = node_info(ctx)?.resource_describe()?;
    let Some(name) = name else {
        return print_describe(&records, ctx.format);
    };

    let Some(sections) = records.get(name) else {
        bail!("node '{}' has no describe record in this bundle", name);
    };
    let single: OrderedMap<_> = std::iter::once((name, sections.clone())).collect();
    print_describe(&single, ctx.format)
}

/// Show the `kubectl get nodes` table
pub fn show_table(ctx: &BundleContext) -> Result<()> {
    print_get_table(&node_info(ctx)?.resource_status()?, ctx.format)
}

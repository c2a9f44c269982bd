//! Pod commands

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use super::BundleContext;
use crate::output::{print_get_table, print_json, print_log_records, print_names, print_table, OutputFormat};
use bundle_lib::{ArchivedResource, LogQuery, PodInfo};

/// Row for the container status table
#[derive(Tabled, serde::Serialize)]
struct ContainerRow {
    #[tabled(rename = "Pod")]
    pod: String,
    #[tabled(rename = "Container")]
    container: String,
    #[tabled(rename = "Init")]
    init: bool,
    #[tabled(rename = "Ready")]
    ready: String,
    #[tabled(rename = "Restarts")]
    restarts: String,
}

fn field(status: &serde_json::Value, key: &str) -> String {
    status
        .get(key)
        .map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| "-".to_string())
}

fn pod_info(ctx: &BundleContext) -> Result<PodInfo> {
    Ok(PodInfo::from_source(ctx.source.clone())?)
}

/// Show container statuses per pod
pub fn show_containers(ctx: &BundleContext) -> Result<()> {
    let containers = pod_info(ctx)?.containers()?;

    if ctx.format == OutputFormat::Json {
        return print_json(&containers);
    }

    let mut rows = Vec::new();
    for (pod, entry) in containers.iter() {
        let init = entry.init_containers.iter().map(|c| (c, true));
        let regular = entry.containers.iter().map(|c| (c, false));
        for ((name, status), init) in init.chain(regular) {
            rows.push(ContainerRow {
                pod: pod.to_string(),
                container: name.to_string(),
                init,
                ready: field(status, "ready"),
                restarts: field(status, "restartCount"),
            });
        }
    }
    print_table(&rows, OutputFormat::Table)
}

/// Group pods by workload class
pub fn show_classes(ctx: &BundleContext) -> Result<()> {
    let classes = pod_info(ctx)?.pods_by_workload_class()?;

    match ctx.format {
        OutputFormat::Json => print_json(&classes),
        OutputFormat::Table => {
            for (class, pods) in classes.iter() {
                println!("{} ({})", class.bold(), pods.len());
                for pod in pods {
                    println!("  {}", pod);
                }
            }
            Ok(())
        }
    }
}

/// Show a container's log, filtered and projected
pub fn show_logs(
    ctx: &BundleContext,
    pod: &str,
    container: &str,
    fields: Option<&str>,
    level: Option<&str>,
) -> Result<()> {
    let query = LogQuery::new(fields.map(LogQuery::parse_fields), level)?;
    let records = pod_info(ctx)?.filtered_container_log(pod, container, query)?;
    print_log_records(&records, ctx.format)
}

/// List pod names
pub fn list_names(ctx: &BundleContext) -> Result<()> {
    print_names(&pod_info(ctx)?.resource_names()?, ctx.format)
}

/// Show the `kubectl get pods` table
pub fn show_table(ctx: &BundleContext) -> Result<()> {
    print_get_table(&pod_info(ctx)?.resource_status()?, ctx.format)
}

//! Pods of the environment namespace

use super::node::WORKLOAD_CLASS_LABEL;
use super::{manifest_items, namespace_scope, open_bundle, ArchivedResource, ResourceView, SharedSource};
use crate::archive::pod_log_path;
use crate::error::{BundleError, Result};
use crate::logs::{LogFilter, LogQuery, LogRecord};
use crate::models::{OrderedMap, PodContainers};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Bucket for pods without a workload class label
pub const UNDEFINED_WORKLOAD_CLASS: &str = "undefined";

/// Pod view over the namespace's `pods` artifacts
#[derive(Clone)]
pub struct PodInfo {
    view: ResourceView,
    namespace: String,
}

impl PodInfo {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_source(open_bundle(path)?)
    }

    pub fn from_source(source: SharedSource) -> Result<Self> {
        let scope = namespace_scope(source.as_ref())?;
        let namespace = scope.dir_name().to_string();
        Ok(Self {
            view: ResourceView::fixed(source, scope, "pods")?,
            namespace,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Container status objects per pod, init containers separate
    pub fn containers(&self) -> Result<OrderedMap<PodContainers>> {
        let manifest = self.view.require_manifest()?;

        let mut pods = OrderedMap::new();
        for item in manifest_items(&manifest) {
            let Some(name) = item.pointer("/metadata/name").and_then(Value::as_str) else {
                continue;
            };
            pods.insert(
                name,
                PodContainers {
                    init_containers: statuses_by_name(item, "/status/initContainerStatuses"),
                    containers: statuses_by_name(item, "/status/containerStatuses"),
                },
            );
        }
        Ok(pods)
    }

    /// Pod names grouped by workload class, classes in first-seen order
    pub fn pods_by_workload_class(&self) -> Result<OrderedMap<Vec<String>>> {
        let manifest = self.view.require_manifest()?;

        let mut classes: OrderedMap<Vec<String>> = OrderedMap::new();
        for item in manifest_items(&manifest) {
            let Some(name) = item.pointer("/metadata/name").and_then(Value::as_str) else {
                continue;
            };
            let class = item
                .pointer("/metadata/labels")
                .and_then(|labels| labels.get(WORKLOAD_CLASS_LABEL))
                .and_then(Value::as_str)
                .unwrap_or(UNDEFINED_WORKLOAD_CLASS);

            match classes.get_mut(class) {
                Some(pods) => pods.push(name.to_string()),
                None => {
                    classes.insert(class, vec![name.to_string()]);
                }
            }
        }
        Ok(classes)
    }

    /// Raw log of one container, or a placeholder line when it was not captured
    pub fn container_log(&self, pod: &str, container: &str) -> Result<String> {
        if pod.is_empty() || container.is_empty() {
            return Err(BundleError::InvalidInput(
                "pod and container must both be given".to_string(),
            ));
        }

        let path = pod_log_path(&self.namespace, pod, container);
        match self.view.source().read_text(&path)? {
            Some(text) => Ok(text),
            None => {
                debug!(path = %path, "Container log absent");
                Ok(no_logs_placeholder(pod, container))
            }
        }
    }

    /// Container log filtered by level and projected onto the requested fields
    pub fn filtered_container_log(
        &self,
        pod: &str,
        container: &str,
        query: LogQuery,
    ) -> Result<Vec<LogRecord>> {
        let text = self.container_log(pod, container)?;
        Ok(LogFilter::new(Some(text), query)?.records())
    }
}

impl ArchivedResource for PodInfo {
    fn view(&self) -> &ResourceView {
        &self.view
    }
}

/// Line returned in place of a log that was not captured
pub fn no_logs_placeholder(pod: &str, container: &str) -> String {
    format!(
        "No logs found for pod '{}' in container '{}'",
        pod, container
    )
}

fn statuses_by_name(item: &Value, pointer: &str) -> OrderedMap<Value> {
    item.pointer(pointer)
        .and_then(Value::as_array)
        .map(|statuses| {
            statuses
                .iter()
                .filter_map(|status| {
                    let name = status.get("name")?.as_str()?;
                    Some((name.to_string(), status.clone()))
                })
                .collect()
        })
        .unwrap_or_default()
}

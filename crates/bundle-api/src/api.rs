//! HTTP API for bundle queries, health checks and Prometheus metrics
//!
//! Every bundle query names its archive through the `file_name` query
//! parameter. The archive is opened fresh for each request and all bundle
//! work runs on the blocking thread pool.

use crate::config::ApiConfig;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bundle_lib::parser::GetTable;
use bundle_lib::resolver::available_resource_types;
use bundle_lib::resources::{
    namespace_scope, open_bundle, EnvInfo, GenericResource, NodeInfo, PodInfo, PvcInfo,
    SharedSource,
};
use bundle_lib::{
    ArchivedResource, BundleError, BundleMetrics, DescribeSections, LogQuery, LogRecord,
    NodeStatus, OrderedMap, PodContainers, Scope, StructuredLogger,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub metrics: BundleMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(config: ApiConfig, metrics: BundleMetrics, logger: StructuredLogger) -> Self {
        Self {
            config,
            metrics,
            logger,
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Error returned to HTTP clients as `{"detail": ...}`
#[derive(Debug)]
pub enum ApiError {
    Bundle(BundleError),
    Internal(String),
}

impl From<BundleError> for ApiError {
    fn from(err: BundleError) -> Self {
        ApiError::Bundle(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Bundle(err) => status_for(err),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Bundle(err) => err.to_string(),
            ApiError::Internal(msg) => msg.clone(),
        }
    }
}

/// Status code for a bundle error
pub fn status_for(err: &BundleError) -> StatusCode {
    match err {
        BundleError::ArchiveUnreadable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        BundleError::ArtifactMissing { .. } | BundleError::ResourceTypeNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        BundleError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        BundleError::InvalidArchive(_)
        | BundleError::MalformedManifest { .. }
        | BundleError::DataInconsistency(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.detail() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// =============================================================================
// Query parameters
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct FileParams {
    pub file_name: String,
}

/// Which directory of the bundle a generic resource lives in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeParam {
    #[default]
    Namespace,
    Clusterwide,
}

#[derive(Debug, Deserialize)]
pub struct ResourceParams {
    pub file_name: String,
    pub resource_name: String,
    #[serde(default)]
    pub scope: ScopeParam,
}

#[derive(Debug, Deserialize)]
pub struct TypesParams {
    pub file_name: String,
    #[serde(default)]
    pub scope: ScopeParam,
}

#[derive(Debug, Deserialize)]
pub struct LogParams {
    pub file_name: String,
    pub pod: String,
    pub container: String,
    /// Comma-separated field names
    pub requested_items: Option<String>,
    pub requested_level: Option<String>,
}

fn generic(source: SharedSource, scope: ScopeParam, token: &str) -> bundle_lib::Result<GenericResource> {
    match scope {
        ScopeParam::Namespace => GenericResource::namespaced(source, token),
        ScopeParam::Clusterwide => GenericResource::clusterwide(source, token),
    }
}

// =============================================================================
// Query execution
// =============================================================================

/// Open the named bundle on the blocking pool and run one query against it
async fn run_query<T, F>(state: &AppState, operation: &str, file_name: &str, query: F) -> ApiResult<T>
where
    T: Serialize + Send + 'static,
    F: FnOnce(SharedSource) -> bundle_lib::Result<T> + Send + 'static,
{
    let started = Instant::now();
    let path = state.config.resolve_archive(file_name)?;
    let archive = path.display().to_string();

    let result = tokio::task::spawn_blocking(move || query(open_bundle(&path)?))
        .await
        .map_err(|e| ApiError::Internal(format!("query task failed: {}", e)))
        .and_then(|r| r.map_err(ApiError::from));

    let elapsed = started.elapsed();
    state.metrics.observe_request_latency(elapsed.as_secs_f64());
    match result {
        Ok(value) => {
            state
                .logger
                .log_request(operation, &archive, elapsed.as_millis() as u64);
            Ok(Json(value))
        }
        Err(err) => {
            state
                .logger
                .log_request_failure(operation, &archive, &err.detail());
            Err(err)
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn env_info(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FileParams>,
) -> ApiResult<EnvInfo> {
    run_query(&state, "env_info", &params.file_name, |source| {
        EnvInfo::load(source.as_ref())
    })
    .await
}

async fn node_status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FileParams>,
) -> ApiResult<OrderedMap<NodeStatus>> {
    let logos = state.config.logos();
    run_query(&state, "node_status", &params.file_name, move |source| {
        NodeInfo::from_source(source, logos)?.node_status()
    })
    .await
}

async fn node_describe(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FileParams>,
) -> ApiResult<OrderedMap<DescribeSections>> {
    let logos = state.config.logos();
    run_query(&state, "node_describe", &params.file_name, move |source| {
        NodeInfo::from_source(source, logos)?.resource_describe()
    })
    .await
}

async fn node_names(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FileParams>,
) -> ApiResult<Vec<String>> {
    let logos = state.config.logos();
    run_query(&state, "node_names", &params.file_name, move |source| {
        NodeInfo::from_source(source, logos)?.resource_names()
    })
    .await
}

async fn get_nodes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FileParams>,
) -> ApiResult<GetTable> {
    let logos = state.config.logos();
    run_query(&state, "get_nodes", &params.file_name, move |source| {
        NodeInfo::from_source(source, logos)?.resource_status()
    })
    .await
}

async fn pod_containers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FileParams>,
) -> ApiResult<OrderedMap<PodContainers>> {
    run_query(&state, "pod_containers", &params.file_name, |source| {
        PodInfo::from_source(source)?.containers()
    })
    .await
}

async fn pod_workload_class(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FileParams>,
) -> ApiResult<OrderedMap<Vec<String>>> {
    run_query(&state, "pod_workload_class", &params.file_name, |source| {
        PodInfo::from_source(source)?.pods_by_workload_class()
    })
    .await
}

async fn pod_logs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LogParams>,
) -> ApiResult<Vec<LogRecord>> {
    let level = params
        .requested_level
        .unwrap_or_else(|| state.config.default_log_level.clone());
    let fields = params.requested_items.as_deref().map(LogQuery::parse_fields);
    let query = LogQuery::new(fields, Some(level.as_str()))?;

    let LogParams { pod, container, .. } = params;
    run_query(&state, "pod_logs", &params.file_name, move |source| {
        PodInfo::from_source(source)?.filtered_container_log(&pod, &container, query)
    })
    .await
}

async fn pvc_describe_pv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FileParams>,
) -> ApiResult<OrderedMap<DescribeSections>> {
    run_query(&state, "pvc_describe_pv", &params.file_name, |source| {
        PvcInfo::from_source(source)?.pv_describe()
    })
    .await
}

async fn resource_status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResourceParams>,
) -> ApiResult<GetTable> {
    let ResourceParams { file_name, resource_name, scope } = params;
    run_query(&state, "resource_status", &file_name, move |source| {
        generic(source, scope, &resource_name)?.resource_status()
    })
    .await
}

async fn resource_describe(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResourceParams>,
) -> ApiResult<OrderedMap<DescribeSections>> {
    let ResourceParams { file_name, resource_name, scope } = params;
    run_query(&state, "resource_describe", &file_name, move |source| {
        generic(source, scope, &resource_name)?.resource_describe()
    })
    .await
}

async fn resource_names(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResourceParams>,
) -> ApiResult<Vec<String>> {
    let ResourceParams { file_name, resource_name, scope } = params;
    run_query(&state, "resource_names", &file_name, move |source| {
        generic(source, scope, &resource_name)?.resource_names()
    })
    .await
}

async fn avail_types(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TypesParams>,
) -> ApiResult<Vec<String>> {
    let scope_param = params.scope;
    run_query(&state, "avail_types", &params.file_name, move |source| {
        let scope = match scope_param {
            ScopeParam::Namespace => namespace_scope(source.as_ref())?,
            ScopeParam::Clusterwide => Scope::Clusterwide,
        };
        Ok(available_resource_types(source.as_ref(), &scope))
    })
    .await
}

/// Liveness: 200 whenever the process is serving
async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Readiness check response - returns 200 if the upload directory exists, 503 otherwise
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ready = state.config.is_ready();
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(json!({
            "ready": ready,
            "upload_dir": state.config.upload_dir.display().to_string(),
        })),
    )
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return ApiError::Internal(format!("failed to encode metrics: {}", e)).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/env/info", get(env_info))
        .route("/api/node/status", get(node_status))
        .route("/api/node/describe", get(node_describe))
        .route("/api/node/list_names", get(node_names))
        .route("/api/node/get_nodes", get(get_nodes))
        .route("/api/pod/containers", get(pod_containers))
        .route("/api/pod/workload_class", get(pod_workload_class))
        .route("/api/pod/logs", get(pod_logs))
        .route("/api/pvc/describe_pv", get(pvc_describe_pv))
        .route("/api/resource/status", get(resource_status))
        .route("/api/resource/describe", get(resource_describe))
        .route("/api/resource/list_names", get(resource_names))
        .route("/api/resource/avail_types", get(avail_types))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

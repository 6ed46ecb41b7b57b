//! Router construction and server host for the API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{Method, Request, header::CONTENT_TYPE},
    response::Response,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{Span, info};
use vfxpipe_fsops::FsOpsService;
use vfxpipe_telemetry::{Metrics, build_sha, propagate_request_id_layer, set_request_id_layer};

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::constants::HEADER_REQUEST_ID;
use crate::http::health::{health, metrics, ping, unknown_route};
use crate::http::ingest::ingest_request;
use crate::http::listing::get_files_folders;
use crate::http::telemetry::RequestCountLayer;
use crate::http::workspace::create_workspace;
use crate::state::ApiState;

/// Axum router wrapper that hosts the vfxpipe endpoints.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Wire the engine and the metrics registry into a router.
    #[must_use]
    pub fn new(engine: FsOpsService, telemetry: Metrics) -> Self {
        let state = Arc::new(ApiState::new(engine, telemetry.clone()));
        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE]);
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                tracing::info_span!(
                    "http.request",
                    method = %request.method(),
                    route = %request.uri().path(),
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_response(|response: &Response, latency: Duration, span: &Span| {
                span.record("status_code", response.status().as_u16());
                let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                span.record("latency_ms", latency_ms);
            });
        let layered = ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(propagate_request_id_layer())
            .layer(trace_layer)
            .layer(RequestCountLayer::new(telemetry));

        let router = Self::routes()
            .fallback(unknown_route)
            .layer(layered)
            .layer(cors_layer)
            .with_state(state);
        Self { router }
    }

    fn routes() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/ping", get(ping))
            .route("/health", get(health))
            .route("/metrics", get(metrics))
            .route("/create_workspace", post(create_workspace))
            .route("/get_files_folders", post(get_files_folders))
            .route("/ingest_request", post(ingest_request))
    }

    /// Serve the API on `addr` until the listener fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind or the server stops unexpectedly.
    pub async fn serve(self, addr: SocketAddr) -> ApiServerResult<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        info!(%addr, "vfxpipe api listening");
        axum::serve(listener, self.router.into_make_service())
            .await
            .map_err(|source| ApiServerError::Serve { source })
    }

    #[cfg(test)]
    pub(crate) const fn router(&self) -> &Router {
        &self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use vfxpipe_fsops::EngineSettings;
    use vfxpipe_test_support::{PipelineTree, write_frames};

    type TestResult<T> = anyhow::Result<T>;

    fn server(tree: &PipelineTree) -> TestResult<ApiServer> {
        let settings = EngineSettings {
            template_root: tree.template_root(),
            project_root: tree.project_root(),
            version_retry_limit: 3,
            copy_workers: 2,
        };
        let metrics = Metrics::new()?;
        let engine = FsOpsService::new(settings, metrics.clone())?;
        Ok(ApiServer::new(engine, metrics))
    }

    async fn send(server: &ApiServer, request: Request<Body>) -> TestResult<(StatusCode, Value)> {
        let response = server.router().clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }

    fn post_json(uri: &str, body: &Value) -> TestResult<Request<Body>> {
        Ok(Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body)?))?)
    }

    fn get(uri: &str) -> TestResult<Request<Body>> {
        Ok(Request::builder().uri(uri).body(Body::empty())?)
    }

    fn ingest_body(src_path: &str, is_sequence: bool) -> Value {
        json!({
            "project": "PROJ_ABC",
            "sequence": "Seq2",
            "shot": "Shot1",
            "department": "comp",
            "type": "plate",
            "is_sequence": is_sequence,
            "src_path": src_path,
            "extension": "exr",
            "naming_scheme": "plate_main",
            "versioning": true,
            "user": "Alice"
        })
    }

    #[tokio::test]
    async fn ping_and_health_respond() -> TestResult<()> {
        let tree = PipelineTree::new()?;
        let server = server(&tree)?;

        let (status, body) = send(&server, get("/ping")?).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Pong!"}));

        let (status, body) = send(&server, get("/health")?).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["build"], build_sha());
        Ok(())
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() -> TestResult<()> {
        let tree = PipelineTree::new()?;
        let server = server(&tree)?;
        let response = server.router().clone().oneshot(get("/ping")?).await?;
        assert!(response.headers().contains_key(HEADER_REQUEST_ID));
        Ok(())
    }

    #[tokio::test]
    async fn create_workspace_provisions_from_template() -> TestResult<()> {
        let tree = PipelineTree::new()?;
        tree.add_template("comp", &["nuke/comp.nk"])?;
        let server = server(&tree)?;
        let body = json!({
            "project": "PROJ_ABC",
            "sequence": "Seq2",
            "shot": "Shot1",
            "department": "comp",
            "user": "Alice"
        });

        let (status, response) = send(&server, post_json("/create_workspace", &body)?).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["result"], true);
        assert_eq!(response["error"], Value::Null);
        let expected = tree.project_root().join("PROJ_ABC/Seq2/Shot1/comp/v0001/comp");
        assert_eq!(response["destination"], expected.display().to_string());
        assert!(expected.join("nuke/comp.nk").is_file());
        Ok(())
    }

    #[tokio::test]
    async fn double_encoded_bodies_are_accepted() -> TestResult<()> {
        let tree = PipelineTree::new()?;
        tree.add_template("comp", &["nuke/comp.nk"])?;
        let server = server(&tree)?;
        let inner = json!({
            "project": "PROJ_ABC",
            "sequence": "Seq2",
            "shot": "Shot1",
            "department": "comp",
            "user": "Alice"
        });
        let encoded = Value::String(serde_json::to_string(&inner)?);

        let (status, response) = send(&server, post_json("/create_workspace", &encoded)?).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["result"], true);
        Ok(())
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_before_touching_disk() -> TestResult<()> {
        let tree = PipelineTree::new()?;
        let server = server(&tree)?;
        let mut body = ingest_body("/does/not/matter", false);
        if let Some(object) = body.as_object_mut() {
            object.remove("versioning");
        }

        let (status, problem) = send(&server, post_json("/ingest_request", &body)?).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(problem["type"], "https://vfxpipe.dev/problems/bad-request");
        assert!(std::fs::read_dir(tree.project_root())?.next().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn empty_fields_report_invalid_params() -> TestResult<()> {
        let tree = PipelineTree::new()?;
        let server = server(&tree)?;
        let mut body = ingest_body("/some/file.exr", false);
        body["shot"] = json!("");

        let (status, problem) = send(&server, post_json("/ingest_request", &body)?).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(problem["invalid_params"][0]["pointer"], "/shot");
        Ok(())
    }

    #[tokio::test]
    async fn separators_in_segments_are_bad_requests() -> TestResult<()> {
        let tree = PipelineTree::new()?;
        tree.add_template("comp", &["nuke/comp.nk"])?;
        let server = server(&tree)?;
        let body = json!({
            "project": "PROJ_ABC",
            "sequence": "Seq2",
            "shot": "a/b",
            "department": "comp",
            "user": "Alice"
        });

        let (status, problem) = send(&server, post_json("/create_workspace", &body)?).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(problem["invalid_params"][0]["pointer"], "/shot");

        let mut body = ingest_body("/some/file.exr", false);
        body["department"] = json!("..");
        body["naming_scheme"] = json!("plate\\main");
        let (status, problem) = send(&server, post_json("/ingest_request", &body)?).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(problem["invalid_params"][0]["pointer"], "/department");
        assert_eq!(problem["invalid_params"][1]["pointer"], "/naming_scheme");
        assert!(std::fs::read_dir(tree.project_root())?.next().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn ingest_sequence_and_missing_source_both_answer_ok() -> TestResult<()> {
        let tree = PipelineTree::new()?;
        let delivery = tree.incoming().join("plates");
        write_frames(&delivery, "shot_", "exr", &[1, 2, 3])?;
        let server = server(&tree)?;

        let body = ingest_body(&delivery.display().to_string(), true);
        let (status, response) = send(&server, post_json("/ingest_request", &body)?).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["result"], true);
        let version_dir = tree
            .project_root()
            .join("PROJ_ABC/Seq2/Shot1/comp/plate/plate_main/v0001");
        assert_eq!(response["destination_path"], version_dir.display().to_string());
        assert!(version_dir.join("plate_main_v0001.1003.exr").is_file());

        let missing = tree.incoming().join("absent.exr");
        let body = ingest_body(&missing.display().to_string(), false);
        let (status, response) = send(&server, post_json("/ingest_request", &body)?).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["result"], false);
        assert_eq!(response["destination_path"], Value::Null);
        assert!(response["error"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn listing_compacts_sequences_and_maps_lookup_errors() -> TestResult<()> {
        let tree = PipelineTree::new()?;
        let shots = tree.incoming().join("shots");
        write_frames(&shots, "shot_", "exr", &[1, 2, 3])?;
        std::fs::write(shots.join("readme.txt"), b"notes")?;
        let server = server(&tree)?;

        let body = json!({
            "search_path": tree.incoming().display().to_string(),
            "folders_to_search": "shots",
            "extension": "exr"
        });
        let (status, response) = send(&server, post_json("/get_files_folders", &body)?).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response["files_found"], json!([["shot_0001.exr", "shot_0003.exr"]]));

        let body = json!({
            "search_path": tree.incoming().display().to_string(),
            "folders_to_search": "missing"
        });
        let (status, response) = send(&server, post_json("/get_files_folders", &body)?).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(response["error"].is_string());

        let body = json!({
            "search_path": tree.incoming().display().to_string(),
            "folders_to_search": "shots/readme.txt"
        });
        let (status, response) = send(&server, post_json("/get_files_folders", &body)?).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["error"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn metrics_count_requests_by_route() -> TestResult<()> {
        let tree = PipelineTree::new()?;
        let server = server(&tree)?;
        send(&server, get("/ping")?).await?;
        let (status, _) = send(&server, get("/nowhere")?).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let response = server.router().clone().oneshot(get("/metrics")?).await?;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let text = String::from_utf8(bytes.to_vec())?;
        assert!(text.contains("http_requests_total"));
        assert!(text.contains("route=\"/ping\""));
        assert!(text.contains("route=\"unmatched\""));
        Ok(())
    }
}

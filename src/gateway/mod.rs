//! HTTP gateway (Axum) speaking the reconciliation protocol.
//!
//! Routes live under [`API_PREFIX`]; `/healthz` and `/ready` stay at the root.

#![allow(missing_docs)]

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};

pub use error::GatewayError;
pub use handler::{reconcile_get_handler, reconcile_post_handler, update_handler, view_handler};
pub use state::HandlerState;

use crate::constants::API_PREFIX;
use crate::store::ReferenceStore;
use crate::terminology::TerminologyClient;

const STATUS_READY: &str = "ready";
const STATUS_ERROR: &str = "error";

pub fn create_router_with_state<S, T>(state: HandlerState<S, T>) -> Router
where
    S: ReferenceStore + Clone + 'static,
    T: TerminologyClient + 'static,
{
    let api = Router::new()
        .route(
            "/reconcile",
            get(reconcile_get_handler).post(reconcile_post_handler),
        )
        .route("/fetch-update-reconciled-data", post(update_handler))
        .route("/view/{*id}", get(view_handler));

    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .nest(API_PREFIX, api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for a single browser origin (OpenRefine), with credentials.
///
/// Methods and headers are mirrored from the preflight request; a wildcard is
/// not allowed together with credentials.
pub fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub store: &'static str,
    pub embedding: Vec<String>,
    pub embedder_mode: &'static str,
    pub terminology: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<S, T>(State(state): State<HandlerState<S, T>>) -> Response
where
    S: ReferenceStore + Clone + 'static,
    T: TerminologyClient + 'static,
{
    let store_status = match state.store.health_check().await {
        Ok(()) => STATUS_READY,
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            STATUS_ERROR
        }
    };

    let scorer = state.reconciler.diagnosis().scorer();
    let embedder_mode = if scorer.is_empty() {
        "none"
    } else if scorer.uses_stub() {
        "stub"
    } else {
        "real"
    };

    let terminology = if state.reconciler.diagnosis().client().is_configured() {
        "configured"
    } else {
        "unconfigured"
    };

    let components = ComponentStatus {
        http: STATUS_READY,
        store: store_status,
        embedding: scorer
            .provider_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        embedder_mode,
        terminology,
    };

    let is_ready = components.store == STATUS_READY;
    let (status_code, status) = if is_ready {
        (StatusCode::OK, STATUS_READY)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    (status_code, Json(ReadyResponse { status, components })).into_response()
}

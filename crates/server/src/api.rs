//! HTTP API for predictions, health checks and Prometheus metrics

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use energy_core::{
    health::{ComponentStatus, HealthRegistry},
    ChartData, EnergyEstimate, EstimateError, FieldSpec, ImpactWeights, InferenceError,
    InferenceService, RawParameters, FIELD_SPECS,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<InferenceService>,
    pub health_registry: HealthRegistry,
    pub impact_weights: ImpactWeights,
}

impl AppState {
    pub fn new(service: InferenceService, health_registry: HealthRegistry, impact_weights: ImpactWeights) -> Self {
        Self {
            service: Arc::new(service),
            health_registry,
            impact_weights,
        }
    }
}

/// Body of a successful `POST /api/v1/predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub estimate: EnergyEstimate,
    pub chart: ChartData,
    pub generated_at: DateTime<Utc>,
}

/// Error returned by the prediction endpoint
#[derive(Debug)]
pub struct ApiError(EstimateError);

impl From<EstimateError> for ApiError {
    fn from(err: EstimateError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();
        match self.0 {
            EstimateError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": message,
                    "code": "validation_error",
                    "field": err.field,
                    "value": err.value,
                    "expected_range": err.expected_range,
                    "kind": err.kind,
                })),
            )
                .into_response(),
            EstimateError::Inference(err) => {
                let status = match err {
                    InferenceError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, Json(json!({ "error": message, "code": err.reason() }))).into_response()
            }
        }
    }
}

/// Validate the submitted parameters and run one inference
async fn predict(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<RawParameters>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let params = state.service.validate(&raw).map_err(EstimateError::from)?;
    let estimate = state.service.infer(&params).map_err(EstimateError::from)?;
    let chart = ChartData::from_estimate(&params, &estimate, &state.impact_weights);

    Ok(Json(PredictionResponse {
        estimate,
        chart,
        generated_at: Utc::now(),
    }))
}

/// Field names, ranges and defaults in feature order
async fn parameters() -> Json<&'static [FieldSpec]> {
    Json(FIELD_SPECS.as_slice())
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
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
        .route("/api/v1/predict", post(predict))
        .route("/api/v1/parameters", get(parameters))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server and run until `shutdown` resolves
pub async fn serve<F>(port: u16, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    Ok(())
}

//! Health reporting for liveness and readiness probes
//!
//! Tracks the model and API components. A missing model makes the service
//! unhealthy but it keeps answering requests with `model_unavailable`.

use crate::predictor::ModelSlot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Operational with caveats (e.g. placeholder estimator)
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn new(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn healthy() -> Self {
        Self::new(ComponentStatus::Healthy, None)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::new(ComponentStatus::Degraded, Some(message.into()))
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::new(ComponentStatus::Unhealthy, Some(message.into()))
    }

    /// Health of the model component given what startup produced
    pub fn for_model(slot: &ModelSlot) -> Self {
        match slot {
            ModelSlot::Loaded(model) if model.kind() == crate::EstimatorKind::Placeholder => {
                Self::degraded("placeholder estimator configured, predictions are not model-derived")
            }
            ModelSlot::Loaded(_) => Self::healthy(),
            ModelSlot::Unavailable(reason) => Self::unhealthy(reason.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Worst component status wins
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        components
            .values()
            .map(|c| c.status)
            .fold(ComponentStatus::Healthy, |acc, status| match (acc, status) {
                (ComponentStatus::Unhealthy, _) | (_, ComponentStatus::Unhealthy) => {
                    ComponentStatus::Unhealthy
                }
                (ComponentStatus::Degraded, _) | (_, ComponentStatus::Degraded) => {
                    ComponentStatus::Degraded
                }
                _ => ComponentStatus::Healthy,
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const MODEL: &str = "model";
    pub const API: &str = "api";
}

#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentHealth>>>,
    ready: Arc<RwLock<bool>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn update(&self, name: &str, health: ComponentHealth) {
        self.components.write().await.insert(name.to_string(), health);
    }

    pub async fn register(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    pub async fn record_model(&self, slot: &ModelSlot) {
        self.update(components::MODEL, ComponentHealth::for_model(slot)).await;
    }

    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        let status = HealthResponse::compute_status(&components);
        HealthResponse { status, components }
    }

    /// Ready once startup finished and no component is unhealthy
    pub async fn readiness(&self) -> ReadinessResponse {
        if !*self.ready.read().await {
            return ReadinessResponse {
                ready: false,
                reason: Some("Service not yet initialized".to_string()),
            };
        }

        let health = self.health().await;
        let unhealthy: Vec<&str> = health
            .components
            .iter()
            .filter(|(_, c)| c.status == ComponentStatus::Unhealthy)
            .map(|(name, _)| name.as_str())
            .collect();

        if unhealthy.is_empty() {
            ReadinessResponse {
                ready: true,
                reason: None,
            }
        } else {
            ReadinessResponse {
                ready: false,
                reason: Some(format!("Unhealthy components: {}", unhealthy.join(", "))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::{LinearModel, PlaceholderEstimator};

    #[tokio::test]
    async fn test_initial_state() {
        let registry = HealthRegistry::new();
        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Healthy);
        assert!(health.components.is_empty());
        assert!(!registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_loaded_model_is_healthy() {
        let registry = HealthRegistry::new();
        registry.register(components::API).await;
        registry
            .record_model(&ModelSlot::loaded(LinearModel::new([0.0; 8], 1.0, "v")))
            .await;
        registry.set_ready(true).await;

        assert_eq!(registry.health().await.status, ComponentStatus::Healthy);
        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_placeholder_is_degraded_but_ready() {
        let registry = HealthRegistry::new();
        registry
            .record_model(&ModelSlot::loaded(PlaceholderEstimator::default()))
            .await;
        registry.set_ready(true).await;

        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Degraded);
        assert!(health.components[components::MODEL].message.is_some());
        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_missing_model_is_unhealthy_and_not_ready() {
        let registry = HealthRegistry::new();
        registry.register(components::API).await;
        registry
            .record_model(&ModelSlot::Unavailable("file not found".to_string()))
            .await;
        registry.set_ready(true).await;

        assert_eq!(registry.health().await.status, ComponentStatus::Unhealthy);
        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert!(readiness.reason.unwrap().contains("model"));
    }

    #[test]
    fn test_worst_status_wins() {
        let mut components = HashMap::new();
        components.insert("a".to_string(), ComponentHealth::degraded("slow"));
        components.insert("b".to_string(), ComponentHealth::healthy());
        assert_eq!(HealthResponse::compute_status(&components), ComponentStatus::Degraded);

        components.insert("c".to_string(), ComponentHealth::unhealthy("down"));
        assert_eq!(HealthResponse::compute_status(&components), ComponentStatus::Unhealthy);
    }
}

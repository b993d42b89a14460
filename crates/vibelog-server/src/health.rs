use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;
use vibelog_config::ServiceConfig;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    status: &'static str,
    service: String,
    model: String,
    gpu: String,
}

/// Health check handler
///
/// Reports the static service identity; never touches the synthesis backend.
pub async fn health_handler(State(service): State<Arc<ServiceConfig>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        service: service.name.clone(),
        model: service.model.clone(),
        gpu: service.gpu.clone(),
    })
}

use axum::{Json, extract::State, http::Uri};

use app_completion::CompletionService;
use app_error::AppError;
use app_models::{HealthDescriptor, ServiceDescriptor};

// Service identity
pub async fn root() -> Json<ServiceDescriptor> {
    Json(ServiceDescriptor::default())
}

// Liveness plus whether the completion provider was configured at startup
pub async fn health(State(completion): State<CompletionService>) -> Json<HealthDescriptor> {
    Json(HealthDescriptor::new(completion.is_configured()))
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::resource_not_found("Route", uri.path())
}

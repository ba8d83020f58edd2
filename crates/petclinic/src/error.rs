use crate::clinic::{BookingError, RepositoryError, VetServiceError};
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Failures surfaced by the service binary and the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
    #[error("booking error: {0}")]
    Booking(#[from] BookingError),
    #[error("vet error: {0}")]
    Vets(#[from] VetServiceError),
    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Booking(BookingError::PetNotFound(_))
            | AppError::Booking(BookingError::Repository(RepositoryError::NotFound))
            | AppError::Vets(VetServiceError::NotFound(_))
            | AppError::Store(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Vets(VetServiceError::Validation(_))
            | AppError::Vets(VetServiceError::UnknownSpecialty(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Booking(_)
            | AppError::Vets(_)
            | AppError::Store(_)
            | AppError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

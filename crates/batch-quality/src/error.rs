use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::import::BatchImportError;
use crate::workflows::quality::{QualityServiceError, RecordStoreError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Import(BatchImportError),
    Quality(QualityServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Quality(err) => write!(f, "quality error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Quality(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Import(BatchImportError::Csv(_))
            | AppError::Quality(QualityServiceError::Report(_))
            | AppError::Quality(QualityServiceError::Import(BatchImportError::Csv(_))) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Quality(QualityServiceError::MissingBatchNumber) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Quality(QualityServiceError::Store(RecordStoreError::NotFound(_))) => {
                StatusCode::NOT_FOUND
            }
            AppError::Quality(QualityServiceError::Store(RecordStoreError::Conflict(_))) => {
                StatusCode::CONFLICT
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Import(BatchImportError::Io(_))
            | AppError::Quality(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<BatchImportError> for AppError {
    fn from(value: BatchImportError) -> Self {
        Self::Import(value)
    }
}

impl From<QualityServiceError> for AppError {
    fn from(value: QualityServiceError) -> Self {
        Self::Quality(value)
    }
}

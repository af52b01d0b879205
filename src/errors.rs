use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::workflow_document::WorkflowKind;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "code": "WRITEOFF_QTY_EXCEEDS_STOCK",
    "message": "Write-off quantity 5 exceeds available stock 3 for product 550e8400-e29b-41d4-a716-446655440000",
    "request_id": "req-abc123xyz",
    "timestamp": "2024-12-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// Stable machine-readable error code
    #[schema(example = "TRANSFER_NOT_FOUND")]
    pub code: String,
    /// Human-readable error description
    pub message: String,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// RFC 3339 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{kind} {id} not found")]
    DocumentNotFound { kind: WorkflowKind, id: Uuid },

    #[error("Product {0} not found")]
    ProductNotFound(Uuid),

    #[error("Store {0} not found")]
    StoreNotFound(Uuid),

    #[error("{kind} quantity {requested} exceeds available stock {available} for product {product_id}")]
    QtyExceedsStock {
        kind: WorkflowKind,
        product_id: Uuid,
        requested: i32,
        available: i32,
    },

    #[error("{kind} {id} is already {status} and can no longer be changed")]
    AlreadyFinalized {
        kind: WorkflowKind,
        id: Uuid,
        status: String,
    },

    #[error("Failed to create {kind}: {source}")]
    CreateFailed { kind: WorkflowKind, source: DbErr },

    #[error("Failed to update {kind}: {source}")]
    UpdateFailed { kind: WorkflowKind, source: DbErr },

    #[error("Failed to create {entity}: {source}")]
    CatalogCreateFailed { entity: &'static str, source: DbErr },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl ServiceError {
    pub fn not_found(kind: WorkflowKind, id: Uuid) -> Self {
        ServiceError::DocumentNotFound { kind, id }
    }

    pub fn create_failed(kind: WorkflowKind) -> impl FnOnce(DbErr) -> Self {
        move |source| ServiceError::CreateFailed { kind, source }
    }

    /// Wraps storage failures into the kind's `*_UPDATE_FAILED`. Errors that
    /// already carry a business meaning pass through untouched.
    pub fn update_failed(kind: WorkflowKind) -> impl FnOnce(ServiceError) -> Self {
        move |err| match err {
            ServiceError::DatabaseError(source) => ServiceError::UpdateFailed { kind, source },
            other => other,
        }
    }

    /// Stable error code exposed to API clients.
    pub fn code(&self) -> String {
        match self {
            Self::DatabaseError(_) => "DATABASE_ERROR".to_string(),
            Self::ValidationError(_) => "VALIDATION_ERROR".to_string(),
            Self::InvalidId(_) => "INVALID_ID".to_string(),
            Self::Unauthorized(_) => "UNAUTHORIZED".to_string(),
            Self::DocumentNotFound { kind, .. } => format!("{}_NOT_FOUND", kind.code_prefix()),
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND".to_string(),
            Self::StoreNotFound(_) => "STORE_NOT_FOUND".to_string(),
            Self::QtyExceedsStock { kind, .. } => {
                format!("{}_QTY_EXCEEDS_STOCK", kind.code_prefix())
            }
            Self::AlreadyFinalized { kind, .. } => {
                format!("{}_ALREADY_FINALIZED", kind.code_prefix())
            }
            Self::CreateFailed { kind, .. } => format!("{}_CREATE_FAILED", kind.code_prefix()),
            Self::UpdateFailed { kind, .. } => format!("{}_UPDATE_FAILED", kind.code_prefix()),
            Self::CatalogCreateFailed { entity, .. } => {
                format!("{}_CREATE_FAILED", entity.to_uppercase())
            }
            Self::SerializationError(_) | Self::InternalError(_) => "INTERNAL_ERROR".to_string(),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) | Self::InvalidId(_) | Self::QtyExceedsStock { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::DocumentNotFound { .. } | Self::ProductNotFound(_) | Self::StoreNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::AlreadyFinalized { .. } => StatusCode::CONFLICT,
            Self::DatabaseError(_)
            | Self::CreateFailed { .. }
            | Self::UpdateFailed { .. }
            | Self::CatalogCreateFailed { .. }
            | Self::SerializationError(_)
            | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) | Self::SerializationError(_) | Self::InternalError(_) => {
                "Internal server error".to_string()
            }
            Self::CreateFailed { kind, .. } => format!("Failed to create {}", kind),
            Self::UpdateFailed { kind, .. } => format!("Failed to update {}", kind),
            Self::CatalogCreateFailed { entity, .. } => format!("Failed to create {}", entity),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = %self.code(), "request failed");
        }

        let err = ErrorResponse {
            code: self.code(),
            message: self.response_message(),
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}

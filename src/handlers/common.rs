use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Parses an `{id}` path segment. Malformed ids are `INVALID_ID`, not 404.
pub fn parse_id(raw: &str) -> Result<Uuid, ServiceError> {
    crate::services::parse_id(raw)
}

/// Pagination parameters for catalog list operations
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// 1-based page number (default: 1)
    pub page: Option<u64>,
    /// Items per page (default from configuration)
    pub limit: Option<u64>,
}

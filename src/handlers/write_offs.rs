use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::common::{created_response, no_content_response, parse_id};
use crate::auth::TenantContext;
use crate::errors::ServiceError;
use crate::services::workflow::{ListDocumentsQuery, WriteOffView};
use crate::services::write_offs::{CreateWriteOffInput, UpdateWriteOffInput};
use crate::{AppState, PaginatedResponse};

pub fn write_offs_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_write_offs).post(create_write_off))
        .route(
            "/:id",
            get(get_write_off)
                .patch(update_write_off)
                .delete(delete_write_off),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/write-offs",
    summary = "List write-offs",
    params(
        ListDocumentsQuery,
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Page of write-offs", body = PaginatedResponse<WriteOffView>),
        (status = 400, description = "Invalid filter, sort or paging parameters", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing tenant", body = crate::errors::ErrorResponse),
    ),
    tag = "write-offs"
)]
pub async fn list_write_offs(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<PaginatedResponse<WriteOffView>>, ServiceError> {
    Ok(Json(state.services.write_offs.list(&ctx, &query).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/write-offs",
    summary = "Create write-off",
    description = "Creates an empty write-off in status NEW. Items are added with PATCH.",
    request_body = CreateWriteOffInput,
    params(("X-Tenant-ID" = String, Header, description = "Tenant identifier")),
    responses(
        (status = 201, description = "Write-off created", body = WriteOffView),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing tenant", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced store not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse),
    ),
    tag = "write-offs"
)]
pub async fn create_write_off(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateWriteOffInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.write_offs.create(&ctx, payload).await?;
    Ok(created_response(created))
}

#[utoipa::path(
    get,
    path = "/api/v1/write-offs/{id}",
    summary = "Get write-off",
    params(
        ("id" = String, Path, description = "Write-off id"),
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Write-off found", body = WriteOffView),
        (status = 400, description = "Malformed id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Write-off not found", body = crate::errors::ErrorResponse),
    ),
    tag = "write-offs"
)]
pub async fn get_write_off(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<WriteOffView>, ServiceError> {
    let id = parse_id(&id)?;
    Ok(Json(state.services.write_offs.get(&ctx, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/write-offs/{id}",
    summary = "Update write-off",
    description = "Replaces the name and/or the whole item list, then applies `action` if present. `approve` removes the written-off stock; `reject` closes the write-off without touching stock. Actions on a finished document are ignored.",
    request_body = UpdateWriteOffInput,
    params(
        ("id" = String, Path, description = "Write-off id"),
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Write-off updated", body = WriteOffView),
        (status = 400, description = "Invalid input or insufficient stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Write-off or referenced product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Write-off is already finalized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse),
    ),
    tag = "write-offs"
)]
pub async fn update_write_off(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
    Json(payload): Json<UpdateWriteOffInput>,
) -> Result<Json<WriteOffView>, ServiceError> {
    let id = parse_id(&id)?;
    Ok(Json(state.services.write_offs.update(&ctx, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/write-offs/{id}",
    summary = "Delete write-off",
    description = "Deletes a write-off that is still NEW.",
    params(
        ("id" = String, Path, description = "Write-off id"),
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 204, description = "Write-off deleted"),
        (status = 404, description = "Write-off not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Write-off is already finalized", body = crate::errors::ErrorResponse),
    ),
    tag = "write-offs"
)]
pub async fn delete_write_off(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id)?;
    state.services.write_offs.delete(&ctx, id).await?;
    Ok(no_content_response())
}

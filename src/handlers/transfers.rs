use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::common::{created_response, no_content_response, parse_id};
use crate::auth::TenantContext;
use crate::errors::ServiceError;
use crate::services::workflow::{ListDocumentsQuery, TransferView};
use crate::services::transfers::{CreateTransferInput, UpdateTransferInput};
use crate::{AppState, PaginatedResponse};

pub fn transfers_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transfers).post(create_transfer))
        .route(
            "/:id",
            get(get_transfer)
                .patch(update_transfer)
                .delete(delete_transfer),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/transfers",
    summary = "List transfers",
    params(
        ListDocumentsQuery,
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Page of transfers", body = PaginatedResponse<TransferView>),
        (status = 400, description = "Invalid filter, sort or paging parameters", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing tenant", body = crate::errors::ErrorResponse),
    ),
    tag = "transfers"
)]
pub async fn list_transfers(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<PaginatedResponse<TransferView>>, ServiceError> {
    Ok(Json(state.services.transfers.list(&ctx, &query).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    summary = "Create transfer",
    description = "Creates an empty transfer in status NEW. Items are added with PATCH.",
    request_body = CreateTransferInput,
    params(("X-Tenant-ID" = String, Header, description = "Tenant identifier")),
    responses(
        (status = 201, description = "Transfer created", body = TransferView),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing tenant", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced store not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse),
    ),
    tag = "transfers"
)]
pub async fn create_transfer(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateTransferInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.transfers.create(&ctx, payload).await?;
    Ok(created_response(created))
}

#[utoipa::path(
    get,
    path = "/api/v1/transfers/{id}",
    summary = "Get transfer",
    params(
        ("id" = String, Path, description = "Transfer id"),
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Transfer found", body = TransferView),
        (status = 400, description = "Malformed id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Transfer not found", body = crate::errors::ErrorResponse),
    ),
    tag = "transfers"
)]
pub async fn get_transfer(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<TransferView>, ServiceError> {
    let id = parse_id(&id)?;
    Ok(Json(state.services.transfers.get(&ctx, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/transfers/{id}",
    summary = "Update transfer",
    description = "Replaces the name and/or the whole item list, then applies `action` if present. `approve` moves the stock out of the departure shop; `reject` closes the transfer without touching stock. Actions on a finished document are ignored.",
    request_body = UpdateTransferInput,
    params(
        ("id" = String, Path, description = "Transfer id"),
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Transfer updated", body = TransferView),
        (status = 400, description = "Invalid input or insufficient stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Transfer or referenced product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transfer is already finalized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse),
    ),
    tag = "transfers"
)]
pub async fn update_transfer(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTransferInput>,
) -> Result<Json<TransferView>, ServiceError> {
    let id = parse_id(&id)?;
    Ok(Json(state.services.transfers.update(&ctx, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/transfers/{id}",
    summary = "Delete transfer",
    description = "Deletes a transfer that is still NEW.",
    params(
        ("id" = String, Path, description = "Transfer id"),
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 204, description = "Transfer deleted"),
        (status = 404, description = "Transfer not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transfer is already finalized", body = crate::errors::ErrorResponse),
    ),
    tag = "transfers"
)]
pub async fn delete_transfer(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id)?;
    state.services.transfers.delete(&ctx, id).await?;
    Ok(no_content_response())
}

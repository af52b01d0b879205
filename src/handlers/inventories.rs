use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::common::{created_response, no_content_response, parse_id};
use crate::auth::TenantContext;
use crate::errors::ServiceError;
use crate::services::workflow::{ListDocumentsQuery, InventoryView};
use crate::services::inventories::{CreateInventoryInput, UpdateInventoryInput};
use crate::{AppState, PaginatedResponse};

pub fn inventories_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventories).post(create_inventory))
        .route(
            "/:id",
            get(get_inventory)
                .patch(update_inventory)
                .delete(delete_inventory),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/inventories",
    summary = "List inventories",
    params(
        ListDocumentsQuery,
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Page of inventories", body = PaginatedResponse<InventoryView>),
        (status = 400, description = "Invalid filter, sort or paging parameters", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing tenant", body = crate::errors::ErrorResponse),
    ),
    tag = "inventories"
)]
pub async fn list_inventories(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<PaginatedResponse<InventoryView>>, ServiceError> {
    Ok(Json(state.services.inventories.list(&ctx, &query).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventories",
    summary = "Create inventory",
    description = "Creates an empty inventory in status NEW. Items are added with PATCH.",
    request_body = CreateInventoryInput,
    params(("X-Tenant-ID" = String, Header, description = "Tenant identifier")),
    responses(
        (status = 201, description = "Inventory created", body = InventoryView),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing tenant", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced store not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse),
    ),
    tag = "inventories"
)]
pub async fn create_inventory(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateInventoryInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.inventories.create(&ctx, payload).await?;
    Ok(created_response(created))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventories/{id}",
    summary = "Get inventory",
    params(
        ("id" = String, Path, description = "Inventory id"),
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Inventory found", body = InventoryView),
        (status = 400, description = "Malformed id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Inventory not found", body = crate::errors::ErrorResponse),
    ),
    tag = "inventories"
)]
pub async fn get_inventory(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<InventoryView>, ServiceError> {
    let id = parse_id(&id)?;
    Ok(Json(state.services.inventories.get(&ctx, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/inventories/{id}",
    summary = "Update inventory",
    description = "Replaces the name and/or the whole item list, then applies `action` if present. `finish` (or `approve`) sets each counted product's stock to the scanned quantity; `cancel` (or `reject`) closes the inventory. Actions on a finished document are ignored.",
    request_body = UpdateInventoryInput,
    params(
        ("id" = String, Path, description = "Inventory id"),
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Inventory updated", body = InventoryView),
        (status = 400, description = "Invalid input or insufficient stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Inventory or referenced product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Inventory is already finalized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse),
    ),
    tag = "inventories"
)]
pub async fn update_inventory(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
    Json(payload): Json<UpdateInventoryInput>,
) -> Result<Json<InventoryView>, ServiceError> {
    let id = parse_id(&id)?;
    Ok(Json(state.services.inventories.update(&ctx, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/inventories/{id}",
    summary = "Delete inventory",
    description = "Deletes a inventory that is still NEW.",
    params(
        ("id" = String, Path, description = "Inventory id"),
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 204, description = "Inventory deleted"),
        (status = 404, description = "Inventory not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Inventory is already finalized", body = crate::errors::ErrorResponse),
    ),
    tag = "inventories"
)]
pub async fn delete_inventory(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id)?;
    state.services.inventories.delete(&ctx, id).await?;
    Ok(no_content_response())
}

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::common::{created_response, parse_id, PaginationParams};
use crate::auth::TenantContext;
use crate::errors::ServiceError;
use crate::services::stores::{CreateStoreInput, StoreView};
use crate::{AppState, PaginatedResponse};

pub fn stores_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stores).post(create_store))
        .route("/:id", get(get_store))
}

#[utoipa::path(
    post,
    path = "/api/v1/stores",
    summary = "Create store",
    request_body = CreateStoreInput,
    params(("X-Tenant-ID" = String, Header, description = "Tenant identifier")),
    responses(
        (status = 201, description = "Store created", body = StoreView),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing tenant", body = crate::errors::ErrorResponse),
    ),
    tag = "stores"
)]
pub async fn create_store(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateStoreInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let store = state.services.stores.create(&ctx, payload).await?;
    Ok(created_response(store))
}

#[utoipa::path(
    get,
    path = "/api/v1/stores",
    summary = "List stores",
    params(
        PaginationParams,
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Page of stores", body = PaginatedResponse<StoreView>),
        (status = 401, description = "Missing tenant", body = crate::errors::ErrorResponse),
    ),
    tag = "stores"
)]
pub async fn list_stores(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<StoreView>>, ServiceError> {
    Ok(Json(
        state
            .services
            .stores
            .list(&ctx, params.page, params.limit)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/stores/{id}",
    summary = "Get store",
    params(
        ("id" = String, Path, description = "Store id"),
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Store found", body = StoreView),
        (status = 404, description = "Store not found", body = crate::errors::ErrorResponse),
    ),
    tag = "stores"
)]
pub async fn get_store(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<StoreView>, ServiceError> {
    let id = parse_id(&id)?;
    Ok(Json(state.services.stores.get(&ctx, id).await?))
}

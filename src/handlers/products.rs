use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::common::{created_response, parse_id, PaginationParams};
use crate::auth::TenantContext;
use crate::errors::ServiceError;
use crate::services::products::{CreateProductInput, ProductView, StockMovementView};
use crate::{AppState, PaginatedResponse};

pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product))
        .route("/:id/movements", get(list_product_movements))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    summary = "Create product",
    request_body = CreateProductInput,
    params(("X-Tenant-ID" = String, Header, description = "Tenant identifier")),
    responses(
        (status = 201, description = "Product created", body = ProductView),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing tenant", body = crate::errors::ErrorResponse),
    ),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateProductInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.products.create(&ctx, payload).await?;
    Ok(created_response(product))
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    summary = "List products",
    params(
        PaginationParams,
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Page of products", body = PaginatedResponse<ProductView>),
        (status = 401, description = "Missing tenant", body = crate::errors::ErrorResponse),
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<ProductView>>, ServiceError> {
    Ok(Json(
        state
            .services
            .products
            .list(&ctx, params.page, params.limit)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    summary = "Get product",
    params(
        ("id" = String, Path, description = "Product id"),
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductView),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<ProductView>, ServiceError> {
    let id = parse_id(&id)?;
    Ok(Json(state.services.products.get(&ctx, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/movements",
    summary = "Stock ledger of a product",
    description = "Stock changes applied by approved transfers, write-offs and finished inventories, newest first.",
    params(
        ("id" = String, Path, description = "Product id"),
        PaginationParams,
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Page of stock movements", body = PaginatedResponse<StockMovementView>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
    tag = "products"
)]
pub async fn list_product_movements(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<StockMovementView>>, ServiceError> {
    let id = parse_id(&id)?;
    Ok(Json(
        state
            .services
            .products
            .movements(&ctx, id, params.page, params.limit)
            .await?,
    ))
}

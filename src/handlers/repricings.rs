use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::common::{created_response, no_content_response, parse_id};
use crate::auth::TenantContext;
use crate::errors::ServiceError;
use crate::services::workflow::{ListDocumentsQuery, RepricingView};
use crate::services::repricings::{CreateRepricingInput, UpdateRepricingInput};
use crate::{AppState, PaginatedResponse};

pub fn repricings_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_repricings).post(create_repricing))
        .route(
            "/:id",
            get(get_repricing)
                .patch(update_repricing)
                .delete(delete_repricing),
        )
}

#[utoipa::path(
    get,
    path = "/api/v1/repricings",
    summary = "List repricings",
    params(
        ListDocumentsQuery,
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Page of repricings", body = PaginatedResponse<RepricingView>),
        (status = 400, description = "Invalid filter, sort or paging parameters", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing tenant", body = crate::errors::ErrorResponse),
    ),
    tag = "repricings"
)]
pub async fn list_repricings(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<PaginatedResponse<RepricingView>>, ServiceError> {
    Ok(Json(state.services.repricings.list(&ctx, &query).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/repricings",
    summary = "Create repricing",
    description = "Creates an empty repricing in status NEW. Items are added with PATCH.",
    request_body = CreateRepricingInput,
    params(("X-Tenant-ID" = String, Header, description = "Tenant identifier")),
    responses(
        (status = 201, description = "Repricing created", body = RepricingView),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing tenant", body = crate::errors::ErrorResponse),
        (status = 404, description = "Referenced store not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse),
    ),
    tag = "repricings"
)]
pub async fn create_repricing(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateRepricingInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.repricings.create(&ctx, payload).await?;
    Ok(created_response(created))
}

#[utoipa::path(
    get,
    path = "/api/v1/repricings/{id}",
    summary = "Get repricing",
    params(
        ("id" = String, Path, description = "Repricing id"),
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Repricing found", body = RepricingView),
        (status = 400, description = "Malformed id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Repricing not found", body = crate::errors::ErrorResponse),
    ),
    tag = "repricings"
)]
pub async fn get_repricing(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<Json<RepricingView>, ServiceError> {
    let id = parse_id(&id)?;
    Ok(Json(state.services.repricings.get(&ctx, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/repricings/{id}",
    summary = "Update repricing",
    description = "Replaces the name and/or the whole item list, then applies `action` if present. `approve` writes the new supply and retail prices; `reject` closes the repricing. Actions on a finished document are ignored.",
    request_body = UpdateRepricingInput,
    params(
        ("id" = String, Path, description = "Repricing id"),
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 200, description = "Repricing updated", body = RepricingView),
        (status = 400, description = "Invalid input or insufficient stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Repricing or referenced product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Repricing is already finalized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Storage failure", body = crate::errors::ErrorResponse),
    ),
    tag = "repricings"
)]
pub async fn update_repricing(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRepricingInput>,
) -> Result<Json<RepricingView>, ServiceError> {
    let id = parse_id(&id)?;
    Ok(Json(state.services.repricings.update(&ctx, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/repricings/{id}",
    summary = "Delete repricing",
    description = "Deletes a repricing that is still NEW.",
    params(
        ("id" = String, Path, description = "Repricing id"),
        ("X-Tenant-ID" = String, Header, description = "Tenant identifier"),
    ),
    responses(
        (status = 204, description = "Repricing deleted"),
        (status = 404, description = "Repricing not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Repricing is already finalized", body = crate::errors::ErrorResponse),
    ),
    tag = "repricings"
)]
pub async fn delete_repricing(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = parse_id(&id)?;
    state.services.repricings.delete(&ctx, id).await?;
    Ok(no_content_response())
}

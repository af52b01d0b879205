use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stock Workflow API",
        version = "0.1.0",
        description = r#"
# Stock Workflow API

Line-itemed back-office documents that move retail stock and prices:

- **Transfers**: move stock out of a departure shop towards an arrival shop
- **Write-offs**: remove damaged, expired or lost stock
- **Repricings**: change supply and retail prices
- **Inventories**: reconcile stock with a physical count

Every document starts as `NEW`, its items are replaced wholesale with `PATCH`,
and a single `action` moves it to a terminal state. Approval applies all of
its product changes or none of them.

## Tenancy

Every `/api/v1` request must carry an `X-Tenant-ID` header. `X-User-ID` and
`X-User-Name` identify the acting user; without them the actor is `system`.

## Error Handling

```json
{
  "code": "TRANSFER_QTY_EXCEEDS_STOCK",
  "message": "Transfer quantity 5 exceeds available stock 3 for product ...",
  "request_id": "req-abc123xyz",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

## Pagination

List endpoints take `page` (1-based) and `limit`, and return
`{items, total, page, limit, total_pages}`.
        "#,
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "transfers", description = "Stock transfers between shops"),
        (name = "write-offs", description = "Stock write-offs"),
        (name = "repricings", description = "Price change documents"),
        (name = "inventories", description = "Stock count reconciliation"),
        (name = "products", description = "Products and their stock ledger"),
        (name = "stores", description = "Shops referenced by documents")
    ),
    paths(
        crate::handlers::transfers::list_transfers,
        crate::handlers::transfers::create_transfer,
        crate::handlers::transfers::get_transfer,
        crate::handlers::transfers::update_transfer,
        crate::handlers::transfers::delete_transfer,

        crate::handlers::write_offs::list_write_offs,
        crate::handlers::write_offs::create_write_off,
        crate::handlers::write_offs::get_write_off,
        crate::handlers::write_offs::update_write_off,
        crate::handlers::write_offs::delete_write_off,

        crate::handlers::repricings::list_repricings,
        crate::handlers::repricings::create_repricing,
        crate::handlers::repricings::get_repricing,
        crate::handlers::repricings::update_repricing,
        crate::handlers::repricings::delete_repricing,

        crate::handlers::inventories::list_inventories,
        crate::handlers::inventories::create_inventory,
        crate::handlers::inventories::get_inventory,
        crate::handlers::inventories::update_inventory,
        crate::handlers::inventories::delete_inventory,

        crate::handlers::products::create_product,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::list_product_movements,

        crate::handlers::stores::create_store,
        crate::handlers::stores::list_stores,
        crate::handlers::stores::get_store,
    ),
    components(
        schemas(
            // Workflow documents
            crate::services::workflow::TransferView,
            crate::services::workflow::WriteOffView,
            crate::services::workflow::RepricingView,
            crate::services::workflow::InventoryView,
            crate::services::workflow::DocumentMeta,
            crate::services::workflow::ShopRef,
            crate::entities::workflow_document::DocumentStatus,
            crate::entities::workflow_document::WorkflowKind,
            crate::auth::Actor,

            // Line items and totals
            crate::services::workflow::StockLineItem,
            crate::services::workflow::RepricingLineItem,
            crate::services::workflow::InventoryLineItem,
            crate::services::workflow::StockItemInput,
            crate::services::workflow::RepricingItemInput,
            crate::services::workflow::InventoryItemInput,
            crate::services::workflow::StockTotals,
            crate::services::workflow::RepricingTotals,
            crate::services::workflow::InventoryTotals,

            // Requests
            crate::services::transfers::CreateTransferInput,
            crate::services::transfers::UpdateTransferInput,
            crate::services::write_offs::CreateWriteOffInput,
            crate::services::write_offs::UpdateWriteOffInput,
            crate::services::repricings::CreateRepricingInput,
            crate::services::repricings::UpdateRepricingInput,
            crate::services::inventories::CreateInventoryInput,
            crate::services::inventories::UpdateInventoryInput,

            // Catalog
            crate::services::products::CreateProductInput,
            crate::services::products::ProductView,
            crate::services::products::StockMovementView,
            crate::services::stores::CreateStoreInput,
            crate::services::stores::StoreView,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_workflow_kind() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string(&openapi).unwrap();
        for path in [
            "/api/v1/transfers/{id}",
            "/api/v1/write-offs/{id}",
            "/api/v1/repricings/{id}",
            "/api/v1/inventories/{id}",
            "/api/v1/products/{id}/movements",
        ] {
            assert!(json.contains(path), "missing {}", path);
        }
        assert!(json.contains("ErrorResponse"));
    }
}

//! Line items as stored on documents, the item payloads clients send, and
//! the per-kind totals derived from them.
//!
//! Stored items snapshot the product's display fields (name, sku, unit) at
//! write time and are never re-resolved afterwards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::product;
use crate::services::validate_non_negative;

/// Product fields copied onto every line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub unit: String,
}

impl From<&product::Model> for ProductSnapshot {
    fn from(product: &product::Model) -> Self {
        Self {
            product_id: product.id,
            product_name: product.name.clone(),
            product_sku: product.sku.clone(),
            unit: product.unit.clone(),
        }
    }
}

/// Transfer and write-off line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockLineItem {
    #[serde(flatten)]
    pub product: ProductSnapshot,
    pub qty: i32,
    pub supply_price: Decimal,
    pub retail_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepricingLineItem {
    #[serde(flatten)]
    pub product: ProductSnapshot,
    pub qty: i32,
    pub old_supply_price: Decimal,
    pub old_retail_price: Decimal,
    pub supply_price: Decimal,
    pub retail_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLineItem {
    #[serde(flatten)]
    pub product: ProductSnapshot,
    /// Stock the system expected when the line was written
    pub declared: i32,
    /// Units physically counted
    pub scanned: i32,
    pub supply_price: Decimal,
    pub retail_price: Decimal,
}

/// Item payload for transfers and write-offs. Prices default to the
/// product's current prices.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockItemInput {
    #[validate(length(min = 1, message = "productId is required"))]
    pub product_id: String,
    #[validate(range(min = 1, message = "qty must be greater than zero"))]
    pub qty: i32,
    #[validate(custom = "validate_non_negative")]
    pub supply_price: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub retail_price: Option<Decimal>,
}

/// Item payload for repricings. `qty` defaults to the product's stock.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepricingItemInput {
    #[validate(length(min = 1, message = "productId is required"))]
    pub product_id: String,
    #[validate(range(min = 0, message = "qty cannot be negative"))]
    pub qty: Option<i32>,
    #[validate(custom = "validate_non_negative")]
    pub supply_price: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub retail_price: Decimal,
}

/// Item payload for inventories. `declared` defaults to the product's stock.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemInput {
    #[validate(length(min = 1, message = "productId is required"))]
    pub product_id: String,
    #[validate(range(min = 0, message = "scanned cannot be negative"))]
    pub scanned: i32,
    #[validate(range(min = 0, message = "declared cannot be negative"))]
    pub declared: Option<i32>,
}

/// Input rows that reference a product.
pub trait ItemInput: Validate {
    fn raw_product_id(&self) -> &str;
}

impl ItemInput for StockItemInput {
    fn raw_product_id(&self) -> &str {
        &self.product_id
    }
}

impl ItemInput for RepricingItemInput {
    fn raw_product_id(&self) -> &str {
        &self.product_id
    }
}

impl ItemInput for InventoryItemInput {
    fn raw_product_id(&self) -> &str {
        &self.product_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockTotals {
    pub total_qty: i64,
    /// Value at retail price
    pub total_price: Decimal,
    /// Value at supply price
    pub total_supply: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepricingTotals {
    pub total: Decimal,
    pub total_items_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryTotals {
    pub total_measurement_value: i64,
    pub shortage: usize,
    pub surplus: usize,
    pub difference_sum: Decimal,
}

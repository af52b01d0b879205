use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::action::inventory_status_id;
use super::items::{
    InventoryLineItem, InventoryTotals, RepricingLineItem, RepricingTotals, StockLineItem,
    StockTotals,
};
use super::totals;
use crate::auth::Actor;
use crate::entities::workflow_document::{DocumentStatus, Model};
use crate::errors::ServiceError;

/// Shop reference with the name snapshotted when the document was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShopRef {
    pub id: Uuid,
    pub name: String,
}

fn shop_ref(id: Option<Uuid>, name: &Option<String>) -> Option<ShopRef> {
    id.map(|id| ShopRef {
        id,
        name: name.clone().unwrap_or_default(),
    })
}

/// Fields every workflow document exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub id: Uuid,
    pub name: String,
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_by: Actor,
    pub finished_by: Option<Actor>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl From<&Model> for DocumentMeta {
    fn from(model: &Model) -> Self {
        let finished_by = model
            .finished_by_id
            .as_ref()
            .map(|id| Actor::new(id.clone(), model.finished_by_name.clone().unwrap_or_default()));
        Self {
            id: model.id,
            name: model.name.clone(),
            status: model.status,
            comment: model.comment.clone(),
            created_by: Actor::new(model.created_by_id.clone(), model.created_by_name.clone()),
            finished_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
            finished_at: model.finished_at,
        }
    }
}

/// Decodes the stored item list. Rows written before items existed hold
/// `null`, which reads as an empty list.
pub fn decode_items<T: DeserializeOwned>(value: &serde_json::Value) -> Result<Vec<T>, ServiceError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_value(value.clone())?)
}

/// Stored totals, or freshly computed ones when the stored value is missing
/// or from an older shape.
fn decode_totals<T, F>(value: &serde_json::Value, compute: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    serde_json::from_value(value.clone()).unwrap_or_else(|_| compute())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferView {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    pub departure_shop: Option<ShopRef>,
    pub arrival_shop: Option<ShopRef>,
    pub items: Vec<StockLineItem>,
    #[serde(flatten)]
    pub totals: StockTotals,
}

impl TryFrom<Model> for TransferView {
    type Error = ServiceError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let items: Vec<StockLineItem> = decode_items(&model.items)?;
        let totals = decode_totals(&model.totals, || totals::stock_totals(&items));
        Ok(Self {
            meta: DocumentMeta::from(&model),
            departure_shop: shop_ref(model.shop_id, &model.shop_name),
            arrival_shop: shop_ref(model.target_shop_id, &model.target_shop_name),
            items,
            totals,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WriteOffView {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    /// Write-off reason category, e.g. `damaged` or `expired`
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub shop: Option<ShopRef>,
    pub items: Vec<StockLineItem>,
    #[serde(flatten)]
    pub totals: StockTotals,
}

impl TryFrom<Model> for WriteOffView {
    type Error = ServiceError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let items: Vec<StockLineItem> = decode_items(&model.items)?;
        let totals = decode_totals(&model.totals, || totals::stock_totals(&items));
        Ok(Self {
            meta: DocumentMeta::from(&model),
            doc_type: model.doc_type.clone(),
            shop: shop_ref(model.shop_id, &model.shop_name),
            items,
            totals,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepricingView {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub shop: Option<ShopRef>,
    pub items: Vec<RepricingLineItem>,
    #[serde(flatten)]
    pub totals: RepricingTotals,
}

impl TryFrom<Model> for RepricingView {
    type Error = ServiceError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let items: Vec<RepricingLineItem> = decode_items(&model.items)?;
        let totals = decode_totals(&model.totals, || totals::repricing_totals(&items));
        Ok(Self {
            meta: DocumentMeta::from(&model),
            doc_type: model.doc_type.clone(),
            shop: shop_ref(model.shop_id, &model.shop_name),
            items,
            totals,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryView {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    /// `open`, `finished` or `cancelled`
    pub status_id: String,
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub shop: Option<ShopRef>,
    pub items: Vec<InventoryLineItem>,
    #[serde(flatten)]
    pub totals: InventoryTotals,
}

impl TryFrom<Model> for InventoryView {
    type Error = ServiceError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let items: Vec<InventoryLineItem> = decode_items(&model.items)?;
        let totals = decode_totals(&model.totals, || totals::inventory_totals(&items));
        Ok(Self {
            meta: DocumentMeta::from(&model),
            status_id: inventory_status_id(model.status).to_string(),
            doc_type: model.doc_type.clone(),
            shop: shop_ref(model.shop_id, &model.shop_name),
            items,
            totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::workflow_document::WorkflowKind;
    use serde_json::json;

    fn model(kind: WorkflowKind, items: serde_json::Value, totals: serde_json::Value) -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            tenant_id: "acme".into(),
            kind,
            name: "Doc".into(),
            doc_type: None,
            status: DocumentStatus::New,
            shop_id: Some(Uuid::new_v4()),
            shop_name: Some("Main".into()),
            target_shop_id: None,
            target_shop_name: None,
            comment: None,
            items,
            totals,
            created_by_id: "u1".into(),
            created_by_name: "Ann".into(),
            finished_by_id: None,
            finished_by_name: None,
            created_at: now,
            updated_at: now,
            finished_at: None,
        }
    }

    #[test]
    fn null_items_read_as_empty_list_with_computed_totals() {
        let view =
            TransferView::try_from(model(WorkflowKind::Transfer, json!(null), json!(null))).unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.totals, StockTotals::default());
        assert_eq!(view.departure_shop.unwrap().name, "Main");
        assert!(view.arrival_shop.is_none());
    }

    #[test]
    fn inventory_view_exposes_status_id() {
        let view =
            InventoryView::try_from(model(WorkflowKind::Inventory, json!([]), json!({}))).unwrap();
        assert_eq!(view.status_id, "open");

        let body = serde_json::to_value(&view).unwrap();
        assert_eq!(body["statusId"], "open");
        assert_eq!(body["totalMeasurementValue"], 0);
        assert_eq!(body["createdBy"]["name"], "Ann");
    }
}

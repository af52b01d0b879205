//! Validation pass of a stock-decrementing approval.

use uuid::Uuid;

use crate::entities::workflow_document::WorkflowKind;
use crate::errors::ServiceError;

/// Units a document takes from one product, summed across its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDemand {
    pub product_id: Uuid,
    pub qty: i32,
}

/// Sums quantities per product, keeping the order in which products first
/// appear so mutations run in list order.
pub fn aggregate_demand<I>(lines: I) -> Vec<StockDemand>
where
    I: IntoIterator<Item = (Uuid, i32)>,
{
    let mut demand: Vec<StockDemand> = Vec::new();
    for (product_id, qty) in lines {
        match demand.iter_mut().find(|d| d.product_id == product_id) {
            Some(existing) => existing.qty = existing.qty.saturating_add(qty),
            None => demand.push(StockDemand { product_id, qty }),
        }
    }
    demand
}

impl StockDemand {
    pub fn check(&self, kind: WorkflowKind, available: i32) -> Result<(), ServiceError> {
        if self.qty > available {
            return Err(ServiceError::QtyExceedsStock {
                kind,
                product_id: self.product_id,
                requested: self.qty,
                available,
            });
        }
        Ok(())
    }
}

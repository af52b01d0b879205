use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::workflow_document::WorkflowKind;

/// Handle for publishing domain events onto the in-process event bus.
///
/// Publishing never fails a request: a full or closed channel is logged and
/// the event is dropped.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, waiting for channel capacity.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends without waiting; failures are logged.
    pub fn send_or_log(&self, event: Event) {
        if let Err(err) = self.sender.try_send(event) {
            warn!(error = %err, "Dropping workflow event");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    DocumentCreated {
        kind: WorkflowKind,
        document_id: Uuid,
        tenant_id: String,
    },
    DocumentItemsReplaced {
        kind: WorkflowKind,
        document_id: Uuid,
        tenant_id: String,
        item_count: usize,
    },
    DocumentApproved {
        kind: WorkflowKind,
        document_id: Uuid,
        tenant_id: String,
        finished_by: String,
    },
    DocumentRejected {
        kind: WorkflowKind,
        document_id: Uuid,
        tenant_id: String,
        finished_by: String,
    },
    DocumentDeleted {
        kind: WorkflowKind,
        document_id: Uuid,
        tenant_id: String,
    },
    StockAdjusted {
        tenant_id: String,
        product_id: Uuid,
        document_kind: WorkflowKind,
        document_id: Uuid,
        previous_stock: i32,
        new_stock: i32,
    },
    PricesChanged {
        tenant_id: String,
        product_id: Uuid,
        document_id: Uuid,
        old_supply_price: Decimal,
        old_retail_price: Decimal,
        supply_price: Decimal,
        retail_price: Decimal,
    },
}

/// Consumes the event bus until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::DocumentCreated {
                kind,
                document_id,
                tenant_id,
            } => {
                info!(%kind, %document_id, %tenant_id, "workflow document created");
            }
            Event::DocumentItemsReplaced {
                kind,
                document_id,
                tenant_id,
                item_count,
            } => {
                info!(%kind, %document_id, %tenant_id, item_count, "workflow items replaced");
            }
            Event::DocumentApproved {
                kind,
                document_id,
                tenant_id,
                finished_by,
            } => {
                info!(%kind, %document_id, %tenant_id, %finished_by, "workflow document approved");
            }
            Event::DocumentRejected {
                kind,
                document_id,
                tenant_id,
                finished_by,
            } => {
                info!(%kind, %document_id, %tenant_id, %finished_by, "workflow document rejected");
            }
            Event::DocumentDeleted {
                kind,
                document_id,
                tenant_id,
            } => {
                info!(%kind, %document_id, %tenant_id, "workflow document deleted");
            }
            Event::StockAdjusted {
                tenant_id,
                product_id,
                document_kind,
                document_id,
                previous_stock,
                new_stock,
            } => {
                info!(
                    %tenant_id,
                    %product_id,
                    kind = %document_kind,
                    %document_id,
                    previous_stock,
                    new_stock,
                    "stock adjusted"
                );
                if new_stock == 0 {
                    warn!(%tenant_id, %product_id, "product is out of stock");
                }
            }
            Event::PricesChanged {
                tenant_id,
                product_id,
                document_id,
                old_supply_price,
                old_retail_price,
                supply_price,
                retail_price,
            } => {
                info!(
                    %tenant_id,
                    %product_id,
                    %document_id,
                    %old_supply_price,
                    %old_retail_price,
                    %supply_price,
                    %retail_price,
                    "prices changed"
                );
                if retail_price < supply_price {
                    warn!(%tenant_id, %product_id, "retail price is below supply price");
                }
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_or_log_drops_when_channel_is_full() {
        let (tx, mut rx) = mpsc::channel(1);
        let sender = EventSender::new(tx);
        let event = Event::DocumentDeleted {
            kind: WorkflowKind::Transfer,
            document_id: Uuid::nil(),
            tenant_id: "t1".into(),
        };

        sender.send_or_log(event.clone());
        sender.send_or_log(event.clone());

        assert_eq!(rx.recv().await, Some(event));
        assert!(rx.try_recv().is_err());
    }
}

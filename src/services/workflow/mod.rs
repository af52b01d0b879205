//! Building blocks shared by the transfer, write-off, repricing and
//! inventory services.

pub mod action;
pub mod engine;
pub mod items;
pub mod plan;
pub mod query;
pub mod totals;
pub mod view;

pub use action::WorkflowAction;
pub use engine::{settle, ItemsPayload, NewDocument, StockChange, WorkflowCore};
pub use items::*;
pub use query::{ListDocumentsQuery, PageLimits};
pub use view::{DocumentMeta, InventoryView, RepricingView, ShopRef, TransferView, WriteOffView};

pub mod product;
pub mod stock_movement;
pub mod store;
pub mod workflow_document;

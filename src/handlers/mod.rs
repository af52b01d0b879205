pub mod common;
pub mod inventories;
pub mod products;
pub mod repricings;
pub mod stores;
pub mod transfers;
pub mod write_offs;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    inventories::InventoryService, products::ProductService, repricings::RepricingService,
    stores::StoreService, transfers::TransferService, workflow::PageLimits,
    write_offs::WriteOffService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Every service the HTTP layer uses, constructed once at startup.
#[derive(Clone)]
pub struct AppServices {
    pub transfers: Arc<TransferService>,
    pub write_offs: Arc<WriteOffService>,
    pub repricings: Arc<RepricingService>,
    pub inventories: Arc<InventoryService>,
    pub products: Arc<ProductService>,
    pub stores: Arc<StoreService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        let limits = PageLimits {
            default_limit: config.default_page_size,
            max_limit: config.max_page_size,
        };

        Self {
            transfers: Arc::new(TransferService::new(
                db_pool.clone(),
                event_sender.clone(),
                limits,
            )),
            write_offs: Arc::new(WriteOffService::new(
                db_pool.clone(),
                event_sender.clone(),
                limits,
            )),
            repricings: Arc::new(RepricingService::new(
                db_pool.clone(),
                event_sender.clone(),
                limits,
            )),
            inventories: Arc::new(InventoryService::new(
                db_pool.clone(),
                event_sender,
                limits,
            )),
            products: Arc::new(ProductService::new(db_pool.clone(), limits)),
            stores: Arc::new(StoreService::new(db_pool, limits)),
        }
    }
}

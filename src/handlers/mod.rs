pub mod catalog;
pub mod common;
pub mod customers;
pub mod directory;
pub mod discounts;
pub mod orders;
pub mod users;

use crate::db::DbPool;
use crate::repositories::UserRepository;
use crate::services::{
    catalog::CatalogService, customers::CustomerService, directory::DirectoryService,
    orders::OrderService, promotions::PromotionService, users::UserService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<UserService>,
    pub catalog: Arc<CatalogService>,
    pub directory: Arc<DirectoryService>,
    pub customers: Arc<CustomerService>,
    pub orders: Arc<OrderService>,
    pub promotions: Arc<PromotionService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            users: Arc::new(UserService::new(users)),
            catalog: Arc::new(CatalogService::new(db_pool.clone())),
            directory: Arc::new(DirectoryService::new(db_pool.clone())),
            customers: Arc::new(CustomerService::new(db_pool.clone())),
            orders: Arc::new(OrderService::new(db_pool.clone())),
            promotions: Arc::new(PromotionService::new(db_pool)),
        }
    }
}

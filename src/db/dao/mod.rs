pub mod address_dao;
pub mod base;
pub mod base_traits;
pub mod cart_dao;
pub mod category_dao;
mod context;
pub mod error;
pub mod order_dao;
pub mod product_dao;
pub mod refresh_token_dao;
pub mod subcategory_dao;
pub mod user_dao;

pub use address_dao::AddressDao;
pub use base::{DaoBase, PaginatedResponse};
pub use base_traits::{HasCreatedAtColumn, HasIdActiveModel, TimestampedActiveModel};
pub use cart_dao::CartDao;
pub use category_dao::CategoryDao;
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use order_dao::OrderDao;
pub use product_dao::ProductDao;
pub use refresh_token_dao::RefreshTokenDao;
pub use subcategory_dao::SubcategoryDao;
pub use user_dao::UserDao;

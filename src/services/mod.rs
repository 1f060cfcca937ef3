pub mod address_service;
pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod context;
pub mod order_service;
pub mod user_service;
pub mod webhook_service;

pub use context::ServiceContext;

pub mod address;
pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod router;
pub mod subcategory;
pub mod upload;
pub mod user;
pub mod webhook;

pub use router::router;

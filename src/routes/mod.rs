pub mod api;
pub mod entry;

pub use entry::{router, API_PREFIX};

pub mod jwt;
pub mod otp;
pub mod password;
mod types;

pub use types::{AdminRole, Claims, RequiredRole, Role, TokenBundle, UserRole};

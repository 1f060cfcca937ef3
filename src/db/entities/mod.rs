#[allow(unused_imports)]
pub mod prelude {
    pub use super::address::Entity as Address;
    pub use super::cart_item::Entity as CartItem;
    pub use super::category::Entity as Category;
    pub use super::order::Entity as Order;
    pub use super::product::Entity as Product;
    pub use super::refresh_token::Entity as RefreshToken;
    pub use super::subcategory::Entity as Subcategory;
    pub use super::user::Entity as User;
}

pub mod address;
pub mod cart_item;
pub mod category;
pub mod order;
pub mod product;
pub mod refresh_token;
pub mod subcategory;
pub mod user;

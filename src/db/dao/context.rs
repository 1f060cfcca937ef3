use sea_orm::DatabaseConnection;

use super::{
    AddressDao, CartDao, CategoryDao, DaoBase, OrderDao, ProductDao, RefreshTokenDao,
    SubcategoryDao, UserDao,
};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn user(&self) -> UserDao {
        DaoBase::new(&self.db)
    }

    pub fn refresh_token(&self) -> RefreshTokenDao {
        DaoBase::new(&self.db)
    }

    pub fn address(&self) -> AddressDao {
        DaoBase::new(&self.db)
    }

    pub fn category(&self) -> CategoryDao {
        DaoBase::new(&self.db)
    }

    pub fn subcategory(&self) -> SubcategoryDao {
        DaoBase::new(&self.db)
    }

    pub fn product(&self) -> ProductDao {
        DaoBase::new(&self.db)
    }

    pub fn cart(&self) -> CartDao {
        DaoBase::new(&self.db)
    }

    pub fn order(&self) -> OrderDao {
        DaoBase::new(&self.db)
    }
}

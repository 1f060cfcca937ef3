use sea_orm::Set;
use uuid::Uuid;

use crate::{
    db::dao::{CartDao, DaoBase, ProductDao},
    db::entities::{cart_item, product},
    error::AppError,
};

/// Cart line joined with its product for display.
#[derive(Debug, serde::Serialize)]
pub struct CartLine {
    pub item: cart_item::Model,
    pub product: product::Model,
}

pub struct CartService {
    cart_dao: CartDao,
    product_dao: ProductDao,
}

impl CartService {
    pub fn new(cart_dao: CartDao, product_dao: ProductDao) -> Self {
        Self {
            cart_dao,
            product_dao,
        }
    }

    /// Adds to the cart. An existing (user, product) line has its quantity
    /// increased instead of a second line being created.
    pub async fn add_item(
        &self,
        user_id: &Uuid,
        product_id: &Uuid,
        quantity: i32,
    ) -> Result<cart_item::Model, AppError> {
        let quantity = quantity.max(1);

        let product = self.product_dao.find_by_id(*product_id).await?;
        if !product.publish {
            return Err(AppError::not_found("Product is not available"));
        }

        let existing = self.cart_dao.find_line(user_id, product_id).await?;
        let requested = existing.as_ref().map_or(0, |line| line.quantity) + quantity;
        if product.stock < requested {
            return Err(AppError::bad_request("Not enough stock available"));
        }

        match existing {
            Some(line) => {
                let updated = self
                    .cart_dao
                    .update(line.id, move |active| {
                        active.quantity = Set(requested);
                    })
                    .await?;
                Ok(updated)
            }
            None => Ok(self.cart_dao.add_line(user_id, product_id, quantity).await?),
        }
    }

    /// Removes one unit from a line, or the whole line when `all` is set or
    /// only one unit remains.
    pub async fn remove_item(
        &self,
        user_id: &Uuid,
        item_id: &Uuid,
        all: bool,
    ) -> Result<Option<cart_item::Model>, AppError> {
        let item = self.cart_dao.find_by_id(*item_id).await?;
        if item.user_id != *user_id {
            return Err(AppError::not_found("Cart item not found"));
        }

        if all || item.quantity <= 1 {
            self.cart_dao.delete(*item_id).await?;
            return Ok(None);
        }

        let remaining = item.quantity - 1;
        let updated = self
            .cart_dao
            .update(*item_id, move |active| {
                active.quantity = Set(remaining);
            })
            .await?;
        Ok(Some(updated))
    }

    pub async fn list_items(&self, user_id: &Uuid) -> Result<Vec<CartLine>, AppError> {
        let items = self.cart_dao.list_for_user(user_id).await?;
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let product = self.product_dao.find_by_id(item.product_id).await?;
            lines.push(CartLine { item, product });
        }
        Ok(lines)
    }

    pub async fn clear(&self, user_id: &Uuid) -> Result<u64, AppError> {
        Ok(self.cart_dao.clear_for_user(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use crate::{
        db::dao::cart_dao::tests::cart_item_model,
        db::dao::product_dao::tests::product_model,
        db::dao::{CartDao, DaoBase, ProductDao},
        error::AppError,
    };

    use super::CartService;

    fn service(db: &sea_orm::DatabaseConnection) -> CartService {
        CartService::new(CartDao::new(db), ProductDao::new(db))
    }

    #[tokio::test]
    async fn add_item_increments_existing_line() {
        let user_id = Uuid::new_v4();
        let product = product_model("Almonds", 10, 250.0);
        let existing = cart_item_model(user_id, product.id, 2);
        let mut incremented = existing.clone();
        incremented.quantity = 3;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[product.clone()]])
            .append_query_results([[existing.clone()]])
            .append_query_results([[existing]])
            .append_query_results([[incremented]])
            .into_connection();

        let line = service(&db)
            .add_item(&user_id, &product.id, 1)
            .await
            .expect("increment should succeed");
        assert_eq!(line.quantity, 3);
    }

    #[tokio::test]
    async fn add_item_rejects_insufficient_stock() {
        let user_id = Uuid::new_v4();
        let product = product_model("Almonds", 1, 250.0);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[product.clone()]])
            .append_query_results([Vec::<crate::db::entities::cart_item::Model>::new()])
            .into_connection();

        let err = service(&db)
            .add_item(&user_id, &product.id, 5)
            .await
            .expect_err("insufficient stock should be rejected");
        assert!(matches!(err, AppError::BadRequest(_, _)));
    }

    #[tokio::test]
    async fn remove_item_deletes_line_at_quantity_one() {
        let user_id = Uuid::new_v4();
        let item = cart_item_model(user_id, Uuid::new_v4(), 1);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[item.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let remaining = service(&db)
            .remove_item(&user_id, &item.id, false)
            .await
            .expect("remove should succeed");
        assert!(remaining.is_none());
    }

    #[tokio::test]
    async fn remove_item_decrements_above_quantity_one() {
        let user_id = Uuid::new_v4();
        let item = cart_item_model(user_id, Uuid::new_v4(), 3);
        let mut decremented = item.clone();
        decremented.quantity = 2;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[item.clone()]])
            .append_query_results([[item.clone()]])
            .append_query_results([[decremented]])
            .into_connection();

        let remaining = service(&db)
            .remove_item(&user_id, &item.id, false)
            .await
            .expect("remove should succeed")
            .expect("line should remain");
        assert_eq!(remaining.quantity, 2);
    }

    #[tokio::test]
    async fn remove_item_hides_foreign_lines() {
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();
        let item = cart_item_model(owner, Uuid::new_v4(), 1);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[item.clone()]])
            .into_connection();

        let err = service(&db)
            .remove_item(&intruder, &item.id, false)
            .await
            .expect_err("foreign cart item should not be visible");
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::cart_item::{self, Entity as CartItem};

#[derive(Clone)]
pub struct CartDao {
    db: DatabaseConnection,
}

impl DaoBase for CartDao {
    type Entity = CartItem;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl CartDao {
    pub async fn add_line(
        &self,
        user_id: &Uuid,
        product_id: &Uuid,
        quantity: i32,
    ) -> DaoResult<cart_item::Model> {
        let model = cart_item::ActiveModel {
            user_id: Set(*user_id),
            product_id: Set(*product_id),
            quantity: Set(quantity),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn find_line(
        &self,
        user_id: &Uuid,
        product_id: &Uuid,
    ) -> DaoResult<Option<cart_item::Model>> {
        CartItem::find()
            .filter(cart_item::Column::UserId.eq(*user_id))
            .filter(cart_item::Column::ProductId.eq(*product_id))
            .one(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn list_for_user(&self, user_id: &Uuid) -> DaoResult<Vec<cart_item::Model>> {
        let user_id = *user_id;
        self.find(
            1,
            Self::MAX_PAGE_SIZE,
            Some((cart_item::Column::CreatedAt, Order::Desc)),
            move |query| query.filter(cart_item::Column::UserId.eq(user_id)),
        )
        .await
        .map(|response| response.data)
    }

    pub async fn clear_for_user(&self, user_id: &Uuid) -> DaoResult<u64> {
        let result = CartItem::delete_many()
            .filter(cart_item::Column::UserId.eq(*user_id))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use crate::db::dao::DaoBase;
    use crate::db::entities::cart_item;

    use super::CartDao;

    pub(crate) fn cart_item_model(user_id: Uuid, product_id: Uuid, quantity: i32) -> cart_item::Model {
        let now = FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid");
        cart_item::Model {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            quantity,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn find_line_matches_user_and_product() {
        let user_id = Uuid::new_v4();
        let product_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[cart_item_model(user_id, product_id, 2)]])
            .into_connection();
        let dao = CartDao::new(&db);

        let line = dao
            .find_line(&user_id, &product_id)
            .await
            .expect("query should succeed")
            .expect("line should exist");
        assert_eq!(line.quantity, 2);
    }

    #[tokio::test]
    async fn clear_for_user_returns_deleted_count() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();
        let dao = CartDao::new(&db);

        let deleted = dao
            .clear_for_user(&Uuid::new_v4())
            .await
            .expect("delete should succeed");
        assert_eq!(deleted, 3);
    }
}

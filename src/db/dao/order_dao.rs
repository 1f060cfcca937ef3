use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult, PaginatedResponse};
use crate::db::entities::order::{self, Entity as OrderEntity};

#[derive(Clone)]
pub struct OrderDao {
    db: DatabaseConnection,
}

impl DaoBase for OrderDao {
    type Entity = OrderEntity;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl OrderDao {
    pub async fn list_for_user(
        &self,
        user_id: &Uuid,
        page: u64,
        page_size: u64,
    ) -> DaoResult<PaginatedResponse<order::Model>> {
        let user_id = *user_id;
        self.find(
            page,
            page_size,
            Some((order::Column::CreatedAt, Order::Desc)),
            move |query| query.filter(order::Column::UserId.eq(user_id)),
        )
        .await
    }

    pub async fn find_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> DaoResult<Option<order::Model>> {
        OrderEntity::find()
            .filter(order::Column::GatewayOrderId.eq(gateway_order_id))
            .one(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn find_by_payment_id(&self, payment_id: &str) -> DaoResult<Option<order::Model>> {
        OrderEntity::find()
            .filter(order::Column::PaymentId.eq(payment_id))
            .one(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::db::dao::DaoBase;
    use crate::db::entities::order::{self, OrderLine, PaymentMode, PaymentStatus};

    use super::OrderDao;

    pub(crate) fn order_model(user_id: Uuid, gateway_order_id: &str) -> order::Model {
        let now = FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid");
        let lines = vec![OrderLine {
            product_id: Uuid::new_v4(),
            quantity: 2,
        }];
        order::Model {
            id: Uuid::new_v4(),
            user_id,
            order_code: "ORD-1767225600000".to_string(),
            lines: serde_json::to_value(lines).expect("lines should serialize"),
            payment_mode: PaymentMode::Online.as_str().to_string(),
            payment_id: String::new(),
            gateway_order_id: gateway_order_id.to_string(),
            delivery_address_id: Uuid::new_v4(),
            subtotal_amount: 500.0,
            total_amount: 500.0,
            payment_status: PaymentStatus::Pending.as_str().to_string(),
            payment_error: None,
            stock_updated: false,
            added_to_history: false,
            refunds: serde_json::json!([]),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn find_by_gateway_order_id_returns_match() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[order_model(user_id, "order_G8x1")]])
            .into_connection();
        let dao = OrderDao::new(&db);

        let order = dao
            .find_by_gateway_order_id("order_G8x1")
            .await
            .expect("query should succeed")
            .expect("order should exist");
        assert_eq!(order.user_id, user_id);
        assert_eq!(order.lines().len(), 1);
    }

    #[tokio::test]
    async fn list_for_user_paginates() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[
                order_model(user_id, "order_a"),
                order_model(user_id, "order_b"),
            ]])
            .into_connection();
        let dao = OrderDao::new(&db);

        let page = dao
            .list_for_user(&user_id, 1, 2)
            .await
            .expect("query should succeed");
        assert_eq!(page.data.len(), 2);
        assert!(!page.has_next);
    }
}

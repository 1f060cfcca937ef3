use std::sync::Arc;

use sea_orm::Set;
use uuid::Uuid;

use crate::{
    clients::{CreateGatewayOrder, GatewayOrder, PaymentGateway},
    config::PaymentConfig,
    db::dao::{AddressDao, DaoBase, OrderDao, PaginatedResponse, ProductDao},
    db::entities::order::{self, OrderLine, PaymentMode, PaymentStatus},
    error::AppError,
};

#[derive(Debug)]
pub struct OrderInput {
    pub lines: Vec<OrderLine>,
    pub delivery_address_id: Uuid,
    pub subtotal_amount: f64,
    pub total_amount: f64,
}

/// What the client needs to open the gateway's hosted checkout.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub gateway_order_id: String,
    pub amount: f64,
    pub currency: String,
    pub key_id: String,
}

pub struct OrderService {
    order_dao: OrderDao,
    product_dao: ProductDao,
    address_dao: AddressDao,
    gateway: Arc<dyn PaymentGateway>,
    payment: Option<PaymentConfig>,
}

impl OrderService {
    pub fn new(
        order_dao: OrderDao,
        product_dao: ProductDao,
        address_dao: AddressDao,
        gateway: Arc<dyn PaymentGateway>,
        payment: Option<PaymentConfig>,
    ) -> Self {
        Self {
            order_dao,
            product_dao,
            address_dao,
            gateway,
            payment,
        }
    }

    pub async fn list_orders(
        &self,
        user_id: &Uuid,
        page: u64,
        page_size: u64,
    ) -> Result<PaginatedResponse<order::Model>, AppError> {
        let orders = self.order_dao.list_for_user(user_id, page, page_size).await?;
        if orders.data.is_empty() {
            return Err(AppError::not_found("No orders found for this user"));
        }
        Ok(orders)
    }

    /// Cash on delivery: the order is final at checkout, so stock comes off
    /// the shelf immediately and both webhook guard flags start set.
    pub async fn place_cod_order(
        &self,
        user_id: &Uuid,
        input: OrderInput,
    ) -> Result<order::Model, AppError> {
        self.validate_order(user_id, &input).await?;

        let model = order::ActiveModel {
            user_id: Set(*user_id),
            order_code: Set(order_code()),
            lines: Set(lines_json(&input.lines)?),
            payment_mode: Set(PaymentMode::CashOnDelivery.as_str().to_string()),
            payment_id: Set(String::new()),
            gateway_order_id: Set(String::new()),
            delivery_address_id: Set(input.delivery_address_id),
            subtotal_amount: Set(input.subtotal_amount),
            total_amount: Set(input.total_amount),
            payment_status: Set(PaymentStatus::Pending.as_str().to_string()),
            payment_error: Set(None),
            stock_updated: Set(true),
            added_to_history: Set(true),
            refunds: Set(serde_json::json!([])),
            ..Default::default()
        };
        let created = self.order_dao.create(model).await?;

        // One conditional update per line; a concurrent checkout can win the
        // race, in which case the row is left untouched.
        for line in &input.lines {
            let decremented = self
                .product_dao
                .decrement_stock(&line.product_id, line.quantity)
                .await?;
            if !decremented {
                tracing::error!(
                    order = %created.order_code,
                    product_id = %line.product_id,
                    quantity = line.quantity,
                    "stock was exhausted between validation and decrement"
                );
            }
        }

        Ok(created)
    }

    /// Online checkout: a hosted order is opened with the gateway and the
    /// local order is parked as Pending. Stock is only decremented once the
    /// gateway reports the payment captured.
    pub async fn create_payment_order(
        &self,
        user_id: &Uuid,
        input: OrderInput,
    ) -> Result<(order::Model, PaymentDetails), AppError> {
        self.validate_order(user_id, &input).await?;

        let payment = self
            .payment
            .as_ref()
            .ok_or_else(|| AppError::internal("payment gateway is not configured"))?;

        let code = order_code();
        let gateway_order = self
            .gateway
            .create_order(CreateGatewayOrder {
                amount: to_minor_units(input.total_amount),
                currency: payment.currency.clone(),
                receipt: code.clone(),
                notes: serde_json::json!({
                    "userId": user_id.to_string(),
                    "deliveryAddressId": input.delivery_address_id.to_string(),
                }),
            })
            .await?;

        let model = order::ActiveModel {
            user_id: Set(*user_id),
            order_code: Set(code),
            lines: Set(lines_json(&input.lines)?),
            payment_mode: Set(PaymentMode::Online.as_str().to_string()),
            payment_id: Set(String::new()),
            gateway_order_id: Set(gateway_order.id.clone()),
            delivery_address_id: Set(input.delivery_address_id),
            subtotal_amount: Set(input.subtotal_amount),
            total_amount: Set(input.total_amount),
            payment_status: Set(PaymentStatus::Pending.as_str().to_string()),
            payment_error: Set(None),
            stock_updated: Set(false),
            added_to_history: Set(false),
            refunds: Set(serde_json::json!([])),
            ..Default::default()
        };
        let created = self.order_dao.create(model).await?;

        Ok((created, self.payment_details(payment, &gateway_order, input.total_amount)))
    }

    fn payment_details(
        &self,
        payment: &PaymentConfig,
        gateway_order: &GatewayOrder,
        total_amount: f64,
    ) -> PaymentDetails {
        PaymentDetails {
            gateway_order_id: gateway_order.id.clone(),
            amount: total_amount,
            currency: gateway_order.currency.clone(),
            key_id: payment.key_id.clone(),
        }
    }

    async fn validate_order(&self, user_id: &Uuid, input: &OrderInput) -> Result<(), AppError> {
        if input.lines.is_empty() {
            return Err(AppError::bad_request("Order must contain at least one product"));
        }
        if input.subtotal_amount <= 0.0 || input.total_amount <= 0.0 {
            return Err(AppError::bad_request("Order amounts must be positive"));
        }

        let owned = self
            .address_dao
            .find_owned(&input.delivery_address_id, user_id)
            .await?;
        if owned.is_none() {
            return Err(AppError::forbidden(
                "Delivery address does not belong to this user",
            ));
        }

        for line in &input.lines {
            if line.quantity < 1 {
                return Err(AppError::bad_request("Quantity must be greater than 0"));
            }
            let product = self.product_dao.find_by_id(line.product_id).await?;
            if product.stock < line.quantity {
                return Err(AppError::bad_request_with_details(
                    format!("Insufficient stock for product {}", product.name),
                    serde_json::json!({
                        "id": product.id.to_string(),
                        "name": product.name,
                        "requestedQuantity": line.quantity,
                        "availableStock": product.stock,
                    }),
                ));
            }
        }
        Ok(())
    }
}

fn order_code() -> String {
    format!("ORD-{}", chrono::Utc::now().timestamp_millis())
}

fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

fn lines_json(lines: &[OrderLine]) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(lines)
        .map_err(|err| AppError::internal(format!("order lines failed to serialize: {err}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::{
        clients::{CreateGatewayOrder, GatewayOrder, PaymentGateway},
        config::PaymentConfig,
        db::dao::address_dao::tests::address_model,
        db::dao::order_dao::tests::order_model,
        db::dao::product_dao::tests::product_model,
        db::dao::{AddressDao, DaoBase, OrderDao, ProductDao},
        db::entities::address,
        db::entities::order::OrderLine,
        error::AppError,
    };

    use super::{to_minor_units, OrderInput, OrderService};

    struct RecordingGateway;

    #[async_trait::async_trait]
    impl PaymentGateway for RecordingGateway {
        async fn create_order(
            &self,
            request: CreateGatewayOrder,
        ) -> Result<GatewayOrder, AppError> {
            Ok(GatewayOrder {
                id: "order_G8x1".to_string(),
                amount: request.amount,
                currency: request.currency,
                status: "created".to_string(),
            })
        }
    }

    fn payment_config() -> PaymentConfig {
        PaymentConfig {
            base_url: "https://gateway.example".to_string(),
            key_id: "key_test".to_string(),
            key_secret: "secret".to_string(),
            webhook_secret: "whsec".to_string(),
            currency: "INR".to_string(),
        }
    }

    fn service(db: &sea_orm::DatabaseConnection) -> OrderService {
        OrderService::new(
            OrderDao::new(db),
            ProductDao::new(db),
            AddressDao::new(db),
            Arc::new(RecordingGateway),
            Some(payment_config()),
        )
    }

    fn input(address_id: Uuid, lines: Vec<OrderLine>) -> OrderInput {
        OrderInput {
            lines,
            delivery_address_id: address_id,
            subtotal_amount: 500.0,
            total_amount: 500.0,
        }
    }

    #[test]
    fn minor_units_round_instead_of_truncating() {
        assert_eq!(to_minor_units(500.0), 50000);
        assert_eq!(to_minor_units(0.1 + 0.2), 30);
    }

    #[tokio::test]
    async fn checkout_rejects_foreign_delivery_address() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<address::Model>::new()])
            .into_connection();

        let err = service(&db)
            .place_cod_order(
                &user_id,
                input(
                    Uuid::new_v4(),
                    vec![OrderLine {
                        product_id: Uuid::new_v4(),
                        quantity: 1,
                    }],
                ),
            )
            .await
            .expect_err("foreign address should be rejected");
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn checkout_rejects_insufficient_stock_with_product_detail() {
        let user_id = Uuid::new_v4();
        let address = address_model(user_id, true);
        let product = product_model("Almonds", 5, 250.0);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[address.clone()]])
            .append_query_results([[product.clone()]])
            .into_connection();

        let err = service(&db)
            .place_cod_order(
                &user_id,
                input(
                    address.id,
                    vec![OrderLine {
                        product_id: product.id,
                        quantity: 6,
                    }],
                ),
            )
            .await
            .expect_err("insufficient stock should be rejected");

        let details = err.details().expect("details should be present");
        assert_eq!(details["requestedQuantity"], 6);
        assert_eq!(details["availableStock"], 5);
        assert_eq!(details["name"], "Almonds");
    }

    #[tokio::test]
    async fn checkout_rejects_empty_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = service(&db)
            .place_cod_order(&Uuid::new_v4(), input(Uuid::new_v4(), vec![]))
            .await
            .expect_err("empty order should be rejected");
        assert!(matches!(err, AppError::BadRequest(_, _)));
    }

    #[tokio::test]
    async fn payment_order_parks_pending_with_gateway_order_id() {
        let user_id = Uuid::new_v4();
        let address = address_model(user_id, true);
        let product = product_model("Almonds", 5, 250.0);
        let created = order_model(user_id, "order_G8x1");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[address.clone()]])
            .append_query_results([[product.clone()]])
            .append_query_results([[created]])
            .into_connection();

        let (order, details) = service(&db)
            .create_payment_order(
                &user_id,
                input(
                    address.id,
                    vec![OrderLine {
                        product_id: product.id,
                        quantity: 2,
                    }],
                ),
            )
            .await
            .expect("payment order should be created");

        assert_eq!(order.gateway_order_id, "order_G8x1");
        assert!(!order.stock_updated);
        assert_eq!(details.gateway_order_id, "order_G8x1");
        assert_eq!(details.key_id, "key_test");
    }
}

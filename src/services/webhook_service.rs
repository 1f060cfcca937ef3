use hmac::{Hmac, Mac};
use sea_orm::Set;
use serde::Deserialize;
use sha2::Sha256;

use crate::{
    db::dao::{DaoBase, OrderDao, ProductDao},
    db::entities::order::{PaymentStatus, RefundRecord},
    error::AppError,
};

type HmacSha256 = Hmac<Sha256>;

/// Cumulative refunds within this much of the total count as a full refund.
const REFUND_TOLERANCE: f64 = 0.01;

/// Verifies the gateway's HMAC-SHA256 signature over the raw payload bytes.
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    let computed = hex::encode(mac.finalize().into_bytes());
    computed == signature
}

/// Gateway event envelope: `{ event, payload: { payment|order|refund: { entity } } }`.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub payload: WebhookPayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    pub payment: Option<EntityWrapper<PaymentEntity>>,
    pub order: Option<EntityWrapper<OrderEntity>>,
    pub refund: Option<EntityWrapper<RefundEntity>>,
}

#[derive(Debug, Deserialize)]
pub struct EntityWrapper<T> {
    pub entity: T,
}

#[derive(Debug, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    pub order_id: String,
    pub error_code: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderEntity {
    pub id: String,
}

/// Refund amounts arrive in the currency's minor unit, like gateway order
/// amounts.
#[derive(Debug, Deserialize)]
pub struct RefundEntity {
    pub id: String,
    pub payment_id: String,
    pub amount: i64,
    #[serde(default)]
    pub notes: serde_json::Value,
}

pub struct WebhookService {
    order_dao: OrderDao,
    product_dao: ProductDao,
}

impl WebhookService {
    pub fn new(order_dao: OrderDao, product_dao: ProductDao) -> Self {
        Self {
            order_dao,
            product_dao,
        }
    }

    /// Dispatches one webhook delivery. Sub-handler failures are logged and
    /// swallowed so the endpoint can always acknowledge receipt.
    pub async fn process(&self, event: WebhookEvent) {
        tracing::info!(event = %event.event, "processing webhook event");

        let outcome = match event.event.as_str() {
            "payment.authorized" => match event.payload.payment {
                Some(wrapper) => self.payment_authorized(wrapper.entity).await,
                None => Err(missing_entity("payment")),
            },
            "payment.captured" => match event.payload.payment {
                Some(wrapper) => self.payment_captured(wrapper.entity).await,
                None => Err(missing_entity("payment")),
            },
            "payment.failed" => match event.payload.payment {
                Some(wrapper) => self.payment_failed(wrapper.entity).await,
                None => Err(missing_entity("payment")),
            },
            "order.paid" => match event.payload.order {
                Some(wrapper) => self.order_paid(wrapper.entity).await,
                None => Err(missing_entity("order")),
            },
            "refund.created" => match event.payload.refund {
                Some(wrapper) => self.refund_created(wrapper.entity).await,
                None => Err(missing_entity("refund")),
            },
            other => {
                tracing::info!(event = %other, "ignoring unhandled webhook event");
                Ok(())
            }
        };

        if let Err(err) = outcome {
            tracing::error!(error = %err, "webhook event processing failed");
        }
    }

    async fn payment_authorized(&self, payment: PaymentEntity) -> Result<(), AppError> {
        let Some(order) = self
            .order_dao
            .find_by_gateway_order_id(&payment.order_id)
            .await?
        else {
            tracing::warn!(gateway_order_id = %payment.order_id, "no order for authorized payment");
            return Ok(());
        };

        self.order_dao
            .update(order.id, move |active| {
                active.payment_status = Set(PaymentStatus::Authorized.as_str().to_string());
                active.payment_id = Set(payment.id);
            })
            .await?;
        Ok(())
    }

    /// Marks the order Completed. The stock decrement and history insertion
    /// run on the first delivery only, gated by the stored flags.
    async fn payment_captured(&self, payment: PaymentEntity) -> Result<(), AppError> {
        let Some(order) = self
            .order_dao
            .find_by_gateway_order_id(&payment.order_id)
            .await?
        else {
            tracing::warn!(gateway_order_id = %payment.order_id, "no order for captured payment");
            return Ok(());
        };

        if !order.stock_updated {
            for line in order.lines() {
                let decremented = self
                    .product_dao
                    .decrement_stock(&line.product_id, line.quantity)
                    .await?;
                if !decremented {
                    tracing::error!(
                        order = %order.order_code,
                        product_id = %line.product_id,
                        quantity = line.quantity,
                        "insufficient stock while settling captured payment"
                    );
                }
            }
        }

        self.order_dao
            .update(order.id, move |active| {
                active.payment_status = Set(PaymentStatus::Completed.as_str().to_string());
                active.payment_id = Set(payment.id);
                active.stock_updated = Set(true);
                active.added_to_history = Set(true);
            })
            .await?;
        Ok(())
    }

    async fn payment_failed(&self, payment: PaymentEntity) -> Result<(), AppError> {
        let Some(order) = self
            .order_dao
            .find_by_gateway_order_id(&payment.order_id)
            .await?
        else {
            tracing::warn!(gateway_order_id = %payment.order_id, "no order for failed payment");
            return Ok(());
        };

        let error = format!(
            "{}: {}",
            payment.error_code.as_deref().unwrap_or("unknown"),
            payment.error_description.as_deref().unwrap_or(""),
        );
        self.order_dao
            .update(order.id, move |active| {
                active.payment_status = Set(PaymentStatus::Failed.as_str().to_string());
                active.payment_error = Set(Some(error));
            })
            .await?;
        Ok(())
    }

    /// `order.paid` can arrive before `payment.captured`; a Completed order
    /// is never downgraded to Paid.
    async fn order_paid(&self, gateway_order: OrderEntity) -> Result<(), AppError> {
        let Some(order) = self
            .order_dao
            .find_by_gateway_order_id(&gateway_order.id)
            .await?
        else {
            tracing::warn!(gateway_order_id = %gateway_order.id, "no order for paid event");
            return Ok(());
        };

        if order.payment_status == PaymentStatus::Completed.as_str() {
            return Ok(());
        }

        self.order_dao
            .update(order.id, |active| {
                active.payment_status = Set(PaymentStatus::Paid.as_str().to_string());
            })
            .await?;
        Ok(())
    }

    async fn refund_created(&self, refund: RefundEntity) -> Result<(), AppError> {
        let Some(order) = self.order_dao.find_by_payment_id(&refund.payment_id).await? else {
            tracing::warn!(payment_id = %refund.payment_id, "no order for refund");
            return Ok(());
        };

        let mut refunds = order.refunds();
        refunds.push(RefundRecord {
            refund_id: refund.id,
            amount: refund.amount as f64 / 100.0,
            reason: refund
                .notes
                .get("reason")
                .and_then(|value| value.as_str())
                .unwrap_or_default()
                .to_string(),
            created_at: chrono::Utc::now(),
        });

        let status = classify_refund(&refunds, order.total_amount);
        let refunds_json = serde_json::to_value(&refunds)
            .map_err(|err| AppError::internal(format!("refunds failed to serialize: {err}")))?;

        self.order_dao
            .update(order.id, move |active| {
                active.refunds = Set(refunds_json);
                active.payment_status = Set(status.as_str().to_string());
            })
            .await?;
        Ok(())
    }
}

fn missing_entity(kind: &str) -> AppError {
    AppError::bad_request(format!("{kind} entity missing from payload"))
}

fn classify_refund(refunds: &[RefundRecord], total_amount: f64) -> PaymentStatus {
    let refunded: f64 = refunds.iter().map(|refund| refund.amount).sum();
    if (refunded - total_amount).abs() < REFUND_TOLERANCE {
        PaymentStatus::Refunded
    } else {
        PaymentStatus::PartiallyRefunded
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use crate::{
        db::dao::order_dao::tests::order_model,
        db::dao::{DaoBase, OrderDao, ProductDao},
        db::entities::order::{PaymentStatus, RefundRecord},
    };

    use super::{
        classify_refund, verify_signature, EntityWrapper, PaymentEntity, WebhookEvent,
        WebhookPayload, WebhookService,
    };

    fn service(db: &sea_orm::DatabaseConnection) -> WebhookService {
        WebhookService::new(OrderDao::new(db), ProductDao::new(db))
    }

    fn payment_event(kind: &str, gateway_order_id: &str) -> WebhookEvent {
        WebhookEvent {
            event: kind.to_string(),
            payload: WebhookPayload {
                payment: Some(EntityWrapper {
                    entity: PaymentEntity {
                        id: "pay_29QQoUBi66xm2f".to_string(),
                        order_id: gateway_order_id.to_string(),
                        error_code: None,
                        error_description: None,
                    },
                }),
                order: None,
                refund: None,
            },
        }
    }

    #[test]
    fn signature_verification_accepts_only_matching_mac() {
        let payload = br#"{"event":"payment.captured"}"#;
        let secret = "whsec_test";

        let mut mac = <hmac::Hmac<sha2::Sha256> as hmac::Mac>::new_from_slice(secret.as_bytes())
            .expect("hmac accepts any key length");
        hmac::Mac::update(&mut mac, payload);
        let signature = hex::encode(hmac::Mac::finalize(mac).into_bytes());

        assert!(verify_signature(secret, payload, &signature));
        assert!(!verify_signature(secret, payload, "deadbeef"));
        assert!(!verify_signature("other_secret", payload, &signature));
    }

    #[test]
    fn refund_classification_uses_tolerance() {
        let refund = |amount| RefundRecord {
            refund_id: "rfnd_1".to_string(),
            amount,
            reason: String::new(),
            created_at: Utc::now(),
        };

        assert_eq!(
            classify_refund(&[refund(499.995)], 500.0),
            PaymentStatus::Refunded
        );
        assert_eq!(
            classify_refund(&[refund(200.0), refund(300.0)], 500.0),
            PaymentStatus::Refunded
        );
        assert_eq!(
            classify_refund(&[refund(200.0)], 500.0),
            PaymentStatus::PartiallyRefunded
        );
    }

    #[tokio::test]
    async fn captured_event_decrements_stock_on_first_delivery_only() {
        let user_id = Uuid::new_v4();
        let fresh = order_model(user_id, "order_G8x1");
        let mut completed = fresh.clone();
        completed.payment_status = PaymentStatus::Completed.as_str().to_string();
        completed.stock_updated = true;
        completed.added_to_history = true;

        // First delivery: find order, decrement stock, update. Second
        // delivery: find order (flags set), update only.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[fresh.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([[fresh.clone()]])
            .append_query_results([[completed.clone()]])
            .append_query_results([[completed.clone()]])
            .append_query_results([[completed.clone()]])
            .append_query_results([[completed]])
            .into_connection();

        let service = service(&db);
        service
            .process(payment_event("payment.captured", "order_G8x1"))
            .await;
        service
            .process(payment_event("payment.captured", "order_G8x1"))
            .await;

        let log = db.into_transaction_log();
        // Debug output escapes the quotes around identifiers.
        let update_count = log
            .iter()
            .filter(|txn| format!("{txn:?}").contains(r#"UPDATE \"products\""#))
            .count();
        assert_eq!(update_count, 1, "stock must be decremented exactly once");
    }

    #[tokio::test]
    async fn unknown_event_is_ignored() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        // No queries are queued; an unhandled event must not touch the db.
        service(&db)
            .process(WebhookEvent {
                event: "payment.downtime.started".to_string(),
                payload: WebhookPayload::default(),
            })
            .await;
    }

    #[tokio::test]
    async fn missing_order_is_swallowed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<crate::db::entities::order::Model>::new()])
            .into_connection();

        // Must not panic or error outward.
        service(&db)
            .process(payment_event("payment.authorized", "order_unknown"))
            .await;
    }
}

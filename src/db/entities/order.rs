use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub user_id: Uuid,
    /// Human-readable order identifier (`ORD-<millis>`).
    #[sea_orm(unique)]
    pub order_code: String,
    /// JSON array of `{ product_id, quantity }` lines.
    pub lines: Json,
    pub payment_mode: String,
    #[sea_orm(default_value = "")]
    pub payment_id: String,
    #[sea_orm(default_value = "")]
    pub gateway_order_id: String,
    pub delivery_address_id: Uuid,
    pub subtotal_amount: f64,
    pub total_amount: f64,
    pub payment_status: String,
    pub payment_error: Option<String>,
    /// Guard against duplicate stock decrement on repeated webhook delivery.
    #[sea_orm(default_value = false)]
    pub stock_updated: bool,
    /// Guard against duplicate order-history insertion.
    #[sea_orm(default_value = false)]
    pub added_to_history: bool,
    /// JSON array of refund sub-records.
    pub refunds: Json,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundRecord {
    pub refund_id: String,
    pub amount: f64,
    #[serde(default)]
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn lines(&self) -> Vec<OrderLine> {
        serde_json::from_value(self.lines.clone()).unwrap_or_default()
    }

    pub fn refunds(&self) -> Vec<RefundRecord> {
        serde_json::from_value(self.refunds.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    CashOnDelivery,
    Online,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::CashOnDelivery => "COD",
            PaymentMode::Online => "Online",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Authorized,
    Completed,
    Failed,
    Paid,
    Refunded,
    PartiallyRefunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Authorized => "Authorized",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Refunded => "Refunded",
            PaymentStatus::PartiallyRefunded => "PartiallyRefunded",
        }
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Pending" => Ok(PaymentStatus::Pending),
            "Authorized" => Ok(PaymentStatus::Authorized),
            "Completed" => Ok(PaymentStatus::Completed),
            "Failed" => Ok(PaymentStatus::Failed),
            "Paid" => Ok(PaymentStatus::Paid),
            "Refunded" => Ok(PaymentStatus::Refunded),
            "PartiallyRefunded" => Ok(PaymentStatus::PartiallyRefunded),
            _ => Err(()),
        }
    }
}

impl crate::db::dao::HasIdActiveModel for ActiveModel {
    fn set_id(&mut self, id: Uuid) {
        self.id = sea_orm::Set(id);
    }
}

impl crate::db::dao::TimestampedActiveModel for ActiveModel {
    fn set_created_at(&mut self, ts: DateTimeWithTimeZone) {
        self.created_at = sea_orm::Set(ts);
    }

    fn set_updated_at(&mut self, ts: DateTimeWithTimeZone) {
        self.updated_at = sea_orm::Set(ts);
    }
}

impl crate::db::dao::HasCreatedAtColumn for Entity {
    fn created_at_column() -> Self::Column {
        Column::CreatedAt
    }
}

#[cfg(test)]
mod tests {
    use super::{PaymentStatus, PaymentMode};

    #[test]
    fn payment_status_roundtrip() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Authorized,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Paid,
            PaymentStatus::Refunded,
            PaymentStatus::PartiallyRefunded,
        ] {
            assert_eq!(PaymentStatus::try_from(status.as_str()), Ok(status));
        }
        assert!(PaymentStatus::try_from("Chargeback").is_err());
    }

    #[test]
    fn payment_mode_labels() {
        assert_eq!(PaymentMode::CashOnDelivery.as_str(), "COD");
        assert_eq!(PaymentMode::Online.as_str(), "Online");
    }
}

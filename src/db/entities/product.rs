use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(default_value = "")]
    pub description: String,
    /// JSON array of image urls.
    pub images: Json,
    /// JSON arrays of category / subcategory ids.
    pub category_ids: Json,
    pub subcategory_ids: Json,
    #[sea_orm(default_value = "")]
    pub unit: String,
    #[sea_orm(default_value = 0)]
    pub stock: i32,
    #[sea_orm(default_value = 0.0)]
    pub price: f64,
    #[sea_orm(default_value = 0.0)]
    pub discount: f64,
    pub more_details: Json,
    pub publish: bool,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub updated_at: DateTimeWithTimeZone,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn image_urls(&self) -> Vec<String> {
        serde_json::from_value(self.images.clone()).unwrap_or_default()
    }

    pub fn category_ids(&self) -> Vec<Uuid> {
        serde_json::from_value(self.category_ids.clone()).unwrap_or_default()
    }

    pub fn subcategory_ids(&self) -> Vec<Uuid> {
        serde_json::from_value(self.subcategory_ids.clone()).unwrap_or_default()
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

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "subcategories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(default_value = "")]
    pub image_url: String,
    /// JSON array of category ids the subcategory belongs to.
    pub category_ids: Json,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub updated_at: DateTimeWithTimeZone,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn category_ids(&self) -> Vec<Uuid> {
        serde_json::from_value(self.category_ids.clone()).unwrap_or_default()
    }
}

pub fn ids_to_json(ids: &[Uuid]) -> Json {
    serde_json::json!(ids)
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
    use uuid::Uuid;

    use super::ids_to_json;

    #[test]
    fn id_list_roundtrips_through_json() {
        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        let json = ids_to_json(&ids);
        let decoded: Vec<Uuid> = serde_json::from_value(json).expect("should decode");
        assert_eq!(decoded, ids);
    }
}

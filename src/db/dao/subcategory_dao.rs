use sea_orm::sea_query::Expr;
use sea_orm::{DatabaseConnection, Order, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::subcategory::{self, ids_to_json, Entity as Subcategory};

#[derive(Clone)]
pub struct SubcategoryDao {
    db: DatabaseConnection,
}

impl DaoBase for SubcategoryDao {
    type Entity = Subcategory;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl SubcategoryDao {
    pub async fn create_subcategory(
        &self,
        name: &str,
        image_url: &str,
        category_ids: &[Uuid],
    ) -> DaoResult<subcategory::Model> {
        let model = subcategory::ActiveModel {
            name: Set(name.to_string()),
            image_url: Set(image_url.to_string()),
            category_ids: Set(ids_to_json(category_ids)),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn list(&self) -> DaoResult<Vec<subcategory::Model>> {
        self.find(
            1,
            Self::MAX_PAGE_SIZE,
            Some((subcategory::Column::Name, Order::Asc)),
            |query| query,
        )
        .await
        .map(|response| response.data)
    }

    /// Subcategories whose jsonb id array contains the given category.
    pub async fn list_by_category(&self, category_id: &Uuid) -> DaoResult<Vec<subcategory::Model>> {
        let needle = serde_json::json!([category_id.to_string()]);
        self.find(
            1,
            Self::MAX_PAGE_SIZE,
            Some((subcategory::Column::Name, Order::Asc)),
            move |query| {
                query.filter(Expr::cust_with_values("category_ids @> $1", [needle]))
            },
        )
        .await
        .map(|response| response.data)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::db::dao::DaoBase;
    use crate::db::entities::subcategory::{self, ids_to_json};

    use super::SubcategoryDao;

    pub(crate) fn subcategory_model(name: &str, category_ids: &[Uuid]) -> subcategory::Model {
        let now = FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid");
        subcategory::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            image_url: format!("https://cdn.example.com/{name}.png"),
            category_ids: ids_to_json(category_ids),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn list_by_category_decodes_id_array() {
        let category_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[subcategory_model("Chips", &[category_id])]])
            .into_connection();
        let dao = SubcategoryDao::new(&db);

        let subcategories = dao
            .list_by_category(&category_id)
            .await
            .expect("query should succeed");
        assert_eq!(subcategories.len(), 1);
        assert_eq!(subcategories[0].category_ids(), vec![category_id]);
    }

    #[tokio::test]
    async fn list_returns_empty_when_no_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<subcategory::Model>::new()])
            .into_connection();
        let dao = SubcategoryDao::new(&db);

        let subcategories = dao.list().await.expect("query should succeed");
        assert!(subcategories.is_empty());
    }
}

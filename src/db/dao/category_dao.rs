use sea_orm::{ColumnTrait, DatabaseConnection, Order, QueryFilter, Set};

use super::{DaoBase, DaoResult};
use crate::db::entities::category::{self, Entity as Category};

#[derive(Clone)]
pub struct CategoryDao {
    db: DatabaseConnection,
}

impl DaoBase for CategoryDao {
    type Entity = Category;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl CategoryDao {
    pub async fn create_category(
        &self,
        name: &str,
        image_url: &str,
    ) -> DaoResult<category::Model> {
        let model = category::ActiveModel {
            name: Set(name.to_string()),
            image_url: Set(image_url.to_string()),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn find_by_name(&self, name: &str) -> DaoResult<Option<category::Model>> {
        let name = name.to_string();
        self.find(1, 1, None, move |query| {
            query.filter(category::Column::Name.eq(name))
        })
        .await
        .map(|response| response.data.into_iter().next())
    }

    pub async fn list(&self) -> DaoResult<Vec<category::Model>> {
        self.find(
            1,
            Self::MAX_PAGE_SIZE,
            Some((category::Column::Name, Order::Asc)),
            |query| query,
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
    use crate::db::entities::category;

    use super::CategoryDao;

    pub(crate) fn category_model(name: &str) -> category::Model {
        let now = FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid");
        category::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            image_url: format!("https://cdn.example.com/{name}.png"),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn find_by_name_returns_matching_category() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[category_model("Snacks")]])
            .into_connection();
        let dao = CategoryDao::new(&db);

        let category = dao
            .find_by_name("Snacks")
            .await
            .expect("query should succeed")
            .expect("category should exist");
        assert_eq!(category.name, "Snacks");
    }

    #[tokio::test]
    async fn find_by_name_returns_none_when_absent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<category::Model>::new()])
            .into_connection();
        let dao = CategoryDao::new(&db);

        let category = dao
            .find_by_name("Missing")
            .await
            .expect("query should succeed");
        assert!(category.is_none());
    }
}

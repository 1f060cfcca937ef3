use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter,
};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult, PaginatedResponse};
use crate::db::entities::product::{self, Entity as Product};

#[derive(Clone)]
pub struct ProductDao {
    db: DatabaseConnection,
}

impl DaoBase for ProductDao {
    type Entity = Product;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn contains_id(column: &str, id: &Uuid) -> sea_orm::sea_query::SimpleExpr {
    let needle = serde_json::json!([id.to_string()]);
    Expr::cust_with_values(format!("{column} @> $1"), [needle])
}

impl ProductDao {
    /// Paginated listing with an optional case-insensitive search over
    /// name and description.
    pub async fn search(
        &self,
        page: u64,
        page_size: u64,
        term: Option<&str>,
    ) -> DaoResult<PaginatedResponse<product::Model>> {
        let pattern = term
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| format!("%{term}%"));
        self.find(
            page,
            page_size,
            Some((product::Column::CreatedAt, Order::Desc)),
            move |query| match pattern {
                Some(pattern) => query.filter(
                    Condition::any()
                        .add(Expr::col(product::Column::Name).ilike(pattern.clone()))
                        .add(Expr::col(product::Column::Description).ilike(pattern)),
                ),
                None => query,
            },
        )
        .await
    }

    pub async fn list_by_category(
        &self,
        category_id: &Uuid,
        limit: u64,
    ) -> DaoResult<Vec<product::Model>> {
        let filter = contains_id("category_ids", category_id);
        self.find(
            1,
            limit.min(Self::MAX_PAGE_SIZE),
            Some((product::Column::CreatedAt, Order::Desc)),
            move |query| query.filter(filter),
        )
        .await
        .map(|response| response.data)
    }

    pub async fn list_by_category_and_subcategory(
        &self,
        category_id: &Uuid,
        subcategory_id: &Uuid,
        page: u64,
        page_size: u64,
    ) -> DaoResult<PaginatedResponse<product::Model>> {
        let category_filter = contains_id("category_ids", category_id);
        let subcategory_filter = contains_id("subcategory_ids", subcategory_id);
        self.find(
            page,
            page_size,
            Some((product::Column::CreatedAt, Order::Desc)),
            move |query| query.filter(category_filter).filter(subcategory_filter),
        )
        .await
    }

    /// Atomically takes `quantity` units off the shelf. Returns false when
    /// the row no longer holds enough stock, leaving it untouched.
    pub async fn decrement_stock(&self, product_id: &Uuid, quantity: i32) -> DaoResult<bool> {
        use sea_orm::sea_query::ExprTrait;

        let result = Product::update_many()
            .col_expr(
                product::Column::Stock,
                Expr::col(product::Column::Stock).sub(quantity),
            )
            .filter(product::Column::Id.eq(*product_id))
            .filter(product::Column::Stock.gte(quantity))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected > 0)
    }

    pub async fn count_referencing_category(&self, category_id: &Uuid) -> DaoResult<u64> {
        Product::find()
            .filter(contains_id("category_ids", category_id))
            .count(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn count_referencing_subcategory(&self, subcategory_id: &Uuid) -> DaoResult<u64> {
        Product::find()
            .filter(contains_id("subcategory_ids", subcategory_id))
            .count(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use crate::db::dao::{DaoBase, DaoLayerError};
    use crate::db::entities::product;

    use super::ProductDao;

    pub(crate) fn product_model(name: &str, stock: i32, price: f64) -> product::Model {
        let now = FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid");
        product::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("{name} description"),
            images: serde_json::json!(["https://cdn.example.com/p.png"]),
            category_ids: serde_json::json!([]),
            subcategory_ids: serde_json::json!([]),
            unit: "1 pack".to_string(),
            stock,
            price,
            discount: 0.0,
            more_details: serde_json::json!({}),
            publish: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn search_reports_has_next_from_extra_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[
                product_model("Almonds", 10, 250.0),
                product_model("Cashews", 5, 400.0),
                product_model("Raisins", 8, 120.0),
            ]])
            .into_connection();
        let dao = ProductDao::new(&db);

        let page = dao
            .search(1, 2, Some("a"))
            .await
            .expect("query should succeed");
        assert_eq!(page.data.len(), 2);
        assert!(page.has_next);
    }

    #[tokio::test]
    async fn search_rejects_zero_page() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let dao = ProductDao::new(&db);

        let err = dao
            .search(0, 10, None)
            .await
            .expect_err("pagination should be rejected");
        assert!(matches!(err, DaoLayerError::InvalidPagination { .. }));
    }

    #[tokio::test]
    async fn decrement_stock_reports_insufficient_stock() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let dao = ProductDao::new(&db);

        let product_id = Uuid::new_v4();
        assert!(dao
            .decrement_stock(&product_id, 2)
            .await
            .expect("update should succeed"));
        assert!(!dao
            .decrement_stock(&product_id, 99)
            .await
            .expect("update should succeed"));
    }
}

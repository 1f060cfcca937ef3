use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::address::{self, Entity as Address};

#[derive(Clone)]
pub struct AddressDao {
    db: DatabaseConnection,
}

impl DaoBase for AddressDao {
    type Entity = Address;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl AddressDao {
    pub async fn list_for_user(&self, user_id: &Uuid) -> DaoResult<Vec<address::Model>> {
        let user_id = *user_id;
        self.find(
            1,
            Self::MAX_PAGE_SIZE,
            Some((address::Column::CreatedAt, Order::Desc)),
            move |query| {
                query
                    .filter(address::Column::UserId.eq(user_id))
                    .filter(address::Column::IsActive.eq(true))
            },
        )
        .await
        .map(|response| response.data)
    }

    /// Fetches an address only if it belongs to the given user.
    pub async fn find_owned(
        &self,
        address_id: &Uuid,
        user_id: &Uuid,
    ) -> DaoResult<Option<address::Model>> {
        Address::find_by_id(*address_id)
            .filter(address::Column::UserId.eq(*user_id))
            .one(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    /// Unsets the default flag on every address the user owns. Paired with a
    /// follow-up update this keeps at most one default per user.
    pub async fn clear_defaults(&self, user_id: &Uuid) -> DaoResult<()> {
        Address::update_many()
            .col_expr(
                address::Column::IsDefault,
                sea_orm::sea_query::Expr::value(false),
            )
            .filter(address::Column::UserId.eq(*user_id))
            .filter(address::Column::IsDefault.eq(true))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(())
    }

    pub async fn set_default(
        &self,
        address_id: &Uuid,
        user_id: &Uuid,
    ) -> DaoResult<address::Model> {
        self.clear_defaults(user_id).await?;
        self.update(*address_id, |active| {
            active.is_default = sea_orm::Set(true);
        })
        .await
    }
}

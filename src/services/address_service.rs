use sea_orm::Set;
use uuid::Uuid;

use crate::{
    db::dao::{AddressDao, DaoBase},
    db::entities::address::{self, AddressType},
    error::AppError,
};

#[derive(Debug)]
pub struct AddressInput {
    pub address_name: String,
    pub address_line_1: String,
    pub address_line_2: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    pub mobile: String,
    pub address_type: AddressType,
    pub is_default: bool,
}

pub struct AddressService {
    address_dao: AddressDao,
}

impl AddressService {
    pub fn new(address_dao: AddressDao) -> Self {
        Self { address_dao }
    }

    /// The first address a user saves becomes the default; afterwards the
    /// default only moves when asked for.
    pub async fn add_address(
        &self,
        user_id: &Uuid,
        input: AddressInput,
    ) -> Result<address::Model, AppError> {
        validate_address_input(&input)?;

        let existing = self.address_dao.list_for_user(user_id).await?;
        let make_default = input.is_default || existing.is_empty();
        if input.is_default && !existing.is_empty() {
            self.address_dao.clear_defaults(user_id).await?;
        }

        let model = address::ActiveModel {
            user_id: Set(*user_id),
            address_name: Set(input.address_name.trim().to_string()),
            address_line_1: Set(input.address_line_1.trim().to_string()),
            address_line_2: Set(input.address_line_2.unwrap_or_default()),
            city: Set(input.city.trim().to_string()),
            state: Set(input.state.trim().to_string()),
            country: Set(input.country.trim().to_string()),
            postal_code: Set(input.postal_code.trim().to_string()),
            mobile: Set(input.mobile.trim().to_string()),
            address_type: Set(input.address_type.as_str().to_string()),
            is_active: Set(true),
            is_default: Set(make_default),
            ..Default::default()
        };
        Ok(self.address_dao.create(model).await?)
    }

    pub async fn list_addresses(&self, user_id: &Uuid) -> Result<Vec<address::Model>, AppError> {
        Ok(self.address_dao.list_for_user(user_id).await?)
    }

    /// Another user's address is indistinguishable from a missing one.
    pub async fn get_address(
        &self,
        user_id: &Uuid,
        address_id: &Uuid,
    ) -> Result<address::Model, AppError> {
        self.require_owned(user_id, address_id).await
    }

    pub async fn update_address(
        &self,
        user_id: &Uuid,
        address_id: &Uuid,
        input: AddressInput,
    ) -> Result<address::Model, AppError> {
        validate_address_input(&input)?;
        self.require_owned(user_id, address_id).await?;

        if input.is_default {
            self.address_dao.clear_defaults(user_id).await?;
        }

        let updated = self
            .address_dao
            .update(*address_id, move |active| {
                active.address_name = Set(input.address_name.trim().to_string());
                active.address_line_1 = Set(input.address_line_1.trim().to_string());
                active.address_line_2 = Set(input.address_line_2.unwrap_or_default());
                active.city = Set(input.city.trim().to_string());
                active.state = Set(input.state.trim().to_string());
                active.country = Set(input.country.trim().to_string());
                active.postal_code = Set(input.postal_code.trim().to_string());
                active.mobile = Set(input.mobile.trim().to_string());
                active.address_type = Set(input.address_type.as_str().to_string());
                if input.is_default {
                    active.is_default = Set(true);
                }
            })
            .await?;
        Ok(updated)
    }

    /// Soft delete; the default address must be reassigned first.
    pub async fn remove_address(&self, user_id: &Uuid, address_id: &Uuid) -> Result<(), AppError> {
        let address = self.require_owned(user_id, address_id).await?;
        if address.is_default {
            return Err(AppError::conflict(
                "Set another default address before deleting this one",
            ));
        }

        self.address_dao
            .update(*address_id, |active| {
                active.is_active = Set(false);
            })
            .await?;
        Ok(())
    }

    pub async fn set_default(
        &self,
        user_id: &Uuid,
        address_id: &Uuid,
    ) -> Result<address::Model, AppError> {
        self.require_owned(user_id, address_id).await?;
        Ok(self.address_dao.set_default(address_id, user_id).await?)
    }

    async fn require_owned(
        &self,
        user_id: &Uuid,
        address_id: &Uuid,
    ) -> Result<address::Model, AppError> {
        self.address_dao
            .find_owned(address_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Address not found"))
    }
}

fn validate_address_input(input: &AddressInput) -> Result<(), AppError> {
    if input.address_line_1.trim().is_empty() {
        return Err(AppError::bad_request("Address line is required"));
    }
    if input.city.trim().is_empty() || input.country.trim().is_empty() {
        return Err(AppError::bad_request("City and country are required"));
    }
    if input.postal_code.trim().is_empty() {
        return Err(AppError::bad_request("Postal code is required"));
    }
    if input.mobile.trim().is_empty() {
        return Err(AppError::bad_request("Mobile number is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::{
        db::dao::address_dao::tests::address_model,
        db::dao::{AddressDao, DaoBase},
        db::entities::address::{self, AddressType},
        error::AppError,
    };

    use super::{AddressInput, AddressService};

    fn input() -> AddressInput {
        AddressInput {
            address_name: "Home".to_string(),
            address_line_1: "12 Market Road".to_string(),
            address_line_2: None,
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            country: "India".to_string(),
            postal_code: "411001".to_string(),
            mobile: "9876543210".to_string(),
            address_type: AddressType::Home,
            is_default: false,
        }
    }

    fn service(db: &sea_orm::DatabaseConnection) -> AddressService {
        AddressService::new(AddressDao::new(db))
    }

    #[tokio::test]
    async fn first_address_becomes_default() {
        let user_id = Uuid::new_v4();
        let mut created = address_model(user_id, true);
        created.is_default = true;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<address::Model>::new()])
            .append_query_results([[created]])
            .into_connection();

        let address = service(&db)
            .add_address(&user_id, input())
            .await
            .expect("create should succeed");
        assert!(address.is_default);
    }

    #[tokio::test]
    async fn remove_address_blocks_deleting_the_default() {
        let user_id = Uuid::new_v4();
        let default_address = address_model(user_id, true);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[default_address.clone()]])
            .into_connection();

        let err = service(&db)
            .remove_address(&user_id, &default_address.id)
            .await
            .expect_err("deleting the default should be blocked");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn validation_rejects_blank_postal_code() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let mut bad = input();
        bad.postal_code = "  ".to_string();

        let err = service(&db)
            .add_address(&Uuid::new_v4(), bad)
            .await
            .expect_err("blank postal code should be rejected");
        assert!(matches!(err, AppError::BadRequest(_, _)));
    }
}

use sea_orm::DatabaseConnection;

use crate::{
    db::dao::DaoContext,
    services::{
        address_service::AddressService, auth_service::AuthService, cart_service::CartService,
        catalog_service::CatalogService, order_service::OrderService,
        user_service::UserService, webhook_service::WebhookService,
    },
    state::AppState,
};

#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            daos: DaoContext::new(db),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db)
    }

    pub fn user(&self, state: &AppState) -> UserService {
        UserService::new(self.daos.user(), state.images.clone())
    }

    pub fn auth(&self, state: &AppState) -> AuthService {
        AuthService::new(
            self.daos.user(),
            self.daos.refresh_token(),
            state.jwt.clone(),
            state.config.clone(),
            state.mailer.clone(),
        )
    }

    pub fn catalog(&self, state: &AppState) -> CatalogService {
        CatalogService::new(
            self.daos.category(),
            self.daos.subcategory(),
            self.daos.product(),
            state.images.clone(),
        )
    }

    pub fn cart(&self) -> CartService {
        CartService::new(self.daos.cart(), self.daos.product())
    }

    pub fn address(&self) -> AddressService {
        AddressService::new(self.daos.address())
    }

    pub fn order(&self, state: &AppState) -> OrderService {
        OrderService::new(
            self.daos.order(),
            self.daos.product(),
            self.daos.address(),
            state.gateway.clone(),
            state.config.payment.clone(),
        )
    }

    pub fn webhook(&self) -> WebhookService {
        WebhookService::new(self.daos.order(), self.daos.product())
    }
}

use axum::Router;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

use crate::{
    config::{AppConfig, AuthConfig, PaymentConfig},
    routes::router,
    state::AppState,
};

pub fn test_config(secret: &[u8]) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth = Some(AuthConfig {
        jwt_secret: String::from_utf8_lossy(secret).into_owned(),
        access_ttl_secs: 3600,
        refresh_ttl_days: 7,
        admin_email: "admin@example.com".to_string(),
        admin_password: "adminpassword".to_string(),
    });
    cfg.payment = Some(PaymentConfig {
        base_url: "https://gateway.example".to_string(),
        key_id: "key_test".to_string(),
        key_secret: "secret".to_string(),
        webhook_secret: "whsec_test".to_string(),
        currency: "INR".to_string(),
    });
    cfg
}

pub fn test_router(secret: &[u8]) -> Router {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    test_router_with_db(secret, db)
}

/// Router over a caller-prepared mock connection, for tests that queue
/// query results up front.
pub fn test_router_with_db(secret: &[u8], db: DatabaseConnection) -> Router {
    let state = AppState::from_config(test_config(secret), db)
        .expect("test state should build from config");
    router(state)
}

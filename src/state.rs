use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{
    auth::jwt::JwtKeys,
    clients::{
        DisabledGateway, HostedGateway, HttpImageStore, HttpMailer, ImageStore, LogMailer, Mailer,
        PaymentGateway, UnconfiguredImageStore,
    },
    config::AppConfig,
    error::AppError,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub jwt: JwtKeys,
    pub gateway: Arc<dyn PaymentGateway>,
    pub images: Arc<dyn ImageStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DatabaseConnection,
        jwt: JwtKeys,
        gateway: Arc<dyn PaymentGateway>,
        images: Arc<dyn ImageStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            db,
            jwt,
            gateway,
            images,
            mailer,
        })
    }

    /// Builds the outbound clients from whatever provider config is present,
    /// falling back to inert implementations so the API can run without them.
    pub fn from_config(config: AppConfig, db: DatabaseConnection) -> Result<Arc<Self>, AppError> {
        let auth = config
            .auth
            .as_ref()
            .ok_or_else(|| AppError::internal("auth config missing"))?;
        let jwt = JwtKeys::from_secret(auth.jwt_secret.as_bytes());

        let gateway: Arc<dyn PaymentGateway> = match config.payment.as_ref() {
            Some(payment) => Arc::new(HostedGateway::new(payment)),
            None => Arc::new(DisabledGateway),
        };
        let images: Arc<dyn ImageStore> = match config.images.as_ref() {
            Some(images) => Arc::new(HttpImageStore::new(images)),
            None => {
                tracing::warn!("image store not configured, uploads will fail");
                Arc::new(UnconfiguredImageStore)
            }
        };
        let mailer: Arc<dyn Mailer> = match config.email.as_ref() {
            Some(email) => Arc::new(HttpMailer::new(email)),
            None => Arc::new(LogMailer),
        };

        Ok(Self::new(config, db, jwt, gateway, images, mailer))
    }
}

pub mod configs;
pub mod defaults;
pub mod envconfig;
pub mod validate;

pub use configs::{
    AppConfig, AuthConfig, DatabaseConfig, EmailConfig, GeneralConfig, ImageStoreConfig,
    LoggingConfig, PaymentConfig,
};
pub use envconfig::EnvConfig;

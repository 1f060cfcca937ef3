pub mod gateway;
pub mod images;
pub mod mailer;
pub mod templates;

pub use gateway::{CreateGatewayOrder, DisabledGateway, GatewayOrder, HostedGateway, PaymentGateway};
pub use images::{HttpImageStore, ImageStore, UnconfiguredImageStore, UploadedImage};
pub use mailer::{HttpMailer, LogMailer, Mailer};

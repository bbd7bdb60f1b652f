pub mod auth;
pub mod config;
pub mod error;
pub mod module;
pub mod types;

pub use auth::{AllowAll, Authenticator, DenyAll, Principal};
pub use config::ServiceConfig;
pub use error::{FieldError, ServiceError, ValidationErrors};
pub use module::Module;
pub use types::new_id;

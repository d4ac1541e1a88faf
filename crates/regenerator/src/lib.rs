mod config;
mod credential_regenerator;
pub mod generators;
mod regenerator_app;
mod retry;

pub use config::{BulkConfig, CredentialConfig, RegeneratorConfig, RetryConfig};
pub use credential_regenerator::{BulkRegenerationSettings, CredentialRegenerator};
pub use regenerator_app::RegeneratorApp;
pub use retry::{RetryPolicy, retry_transient};

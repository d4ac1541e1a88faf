mod credential_storage_config;

pub use credential_storage_config::CredentialStorageConfig;

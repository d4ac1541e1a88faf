use config::ConfigError;
use serde::{Deserialize, Serialize};

use crate::storage::credentials::{
    CredentialStorage, FileCredentialRepository, InMemoryCredentialRepository,
};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum CredentialStorageConfig {
    #[serde(rename = "InMemory")]
    InMemory,
    #[serde(rename = "File")]
    File {
        /// file path where credential versions will be stored
        state_file: String,
    },
}

impl CredentialStorageConfig {
    /// Validate that the credential storage configuration is complete and usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            CredentialStorageConfig::InMemory => Ok(()),
            CredentialStorageConfig::File { state_file } => {
                if state_file.is_empty() {
                    return Err(ConfigError::Message(
                        "Credential storage state_file cannot be empty".to_string(),
                    ));
                }

                // Validate the directory exists
                let parent = std::path::Path::new(state_file).parent().ok_or_else(|| {
                    ConfigError::Message(
                        "Credential storage state_file must have a valid parent directory"
                            .to_string(),
                    )
                })?;
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(ConfigError::Message(format!(
                        "Credential storage state_file parent directory does not exist: {}",
                        parent.display()
                    )));
                }

                Ok(())
            }
        }
    }

    /// Creates a credential storage instance based on the given configuration.
    pub fn build_credential_storage(&self) -> Result<CredentialStorage, ConfigError> {
        match self {
            CredentialStorageConfig::File { state_file } => {
                let repository = FileCredentialRepository::new(state_file.clone()).map_err(|e| {
                    ConfigError::Message(format!("Failed to create credential storage: {}", e))
                })?;
                Ok(CredentialStorage::File(repository))
            }
            CredentialStorageConfig::InMemory => Ok(CredentialStorage::InMemory(
                InMemoryCredentialRepository::new(),
            )),
        }
    }
}

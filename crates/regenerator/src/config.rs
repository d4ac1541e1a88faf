use std::{collections::HashSet, time::Duration};

use config::{Config, ConfigError, Environment, File};
use credregen_common::{CredentialName, GenerationParameters, config::CredentialStorageConfig};
use serde::{Deserialize, Serialize};

use crate::{credential_regenerator::BulkRegenerationSettings, retry::RetryPolicy};

/// Default bound on one bulk regeneration = 5 minutes
const DEFAULT_BULK_TIMEOUT_SECONDS: u64 = 300;
const DEFAULT_MAX_CONCURRENCY: usize = 8;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 100;
const DEFAULT_MAX_BACKOFF_MS: u64 = 2000;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegeneratorConfig {
    /// Credential storage configuration
    pub credential_storage: CredentialStorageConfig,

    #[serde(default)]
    pub bulk: BulkConfig,

    /// Retries applied to transient credential store failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// Credentials generated at start-up when not already stored, in listed order
    #[serde(default)]
    pub credentials: Vec<CredentialConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BulkConfig {
    /// Defaults given by [`DEFAULT_BULK_TIMEOUT_SECONDS`]
    #[serde(default = "default_bulk_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Defaults given by [`DEFAULT_MAX_CONCURRENCY`]
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CredentialConfig {
    /// Name of the credential
    pub name: String,

    /// Shape of the generated value
    pub parameters: GenerationParameters,
}

impl RegeneratorConfig {
    /// Load configuration from multiple sources in order of priority:
    /// 1. Configuration file (config.toml, config.yaml, config.json)
    /// 2. Environment variables (prefixed with CREDREGEN__)
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("CREDREGEN").separator("__"))
            .build()?;

        let regenerator_config: Self = config.try_deserialize()?;

        regenerator_config.validate()?;

        Ok(regenerator_config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("CREDREGEN").separator("__"))
            .build()?;

        let regenerator_config: Self = config.try_deserialize()?;

        regenerator_config.validate()?;

        Ok(regenerator_config)
    }

    /// Validate the entire regenerator configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.credential_storage.validate()?;
        self.bulk.validate()?;
        self.retry.validate()?;

        let mut seen = HashSet::new();
        for credential in &self.credentials {
            let name = credential.credential_name()?;
            if !seen.insert(name.clone()) {
                return Err(ConfigError::Message(format!(
                    "Credential {} is configured more than once",
                    name
                )));
            }
            credential.parameters.validate().map_err(|e| {
                ConfigError::Message(format!("Credential {}: {}", name, e))
            })?;
        }

        Ok(())
    }
}

impl BulkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "bulk timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::Message(
                "bulk max_concurrency must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn settings(&self) -> BulkRegenerationSettings {
        BulkRegenerationSettings {
            timeout: Duration::from_secs(self.timeout_seconds),
            max_concurrency: self.max_concurrency,
        }
    }
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_BULK_TIMEOUT_SECONDS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl RetryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Message(
                "retry max_attempts must be at least 1".to_string(),
            ));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(ConfigError::Message(format!(
                "retry initial_backoff_ms ({}) cannot exceed max_backoff_ms ({})",
                self.initial_backoff_ms, self.max_backoff_ms
            )));
        }
        Ok(())
    }

    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
        }
    }
}

impl CredentialConfig {
    pub fn credential_name(&self) -> Result<CredentialName, ConfigError> {
        CredentialName::parse(&self.name).map_err(|e| {
            ConfigError::Message(format!("Invalid credential name '{}': {}", self.name, e))
        })
    }
}

fn default_bulk_timeout_seconds() -> u64 {
    DEFAULT_BULK_TIMEOUT_SECONDS
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_initial_backoff_ms() -> u64 {
    DEFAULT_INITIAL_BACKOFF_MS
}

fn default_max_backoff_ms() -> u64 {
    DEFAULT_MAX_BACKOFF_MS
}

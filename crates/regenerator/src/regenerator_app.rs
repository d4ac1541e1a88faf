use anyhow::{Context, Result};
use credregen_common::storage::credentials::{CredentialRepository, CredentialStorage};
use tracing::info;

use crate::{
    config::{CredentialConfig, RegeneratorConfig},
    credential_regenerator::CredentialRegenerator,
};

/// Main regenerator application
pub struct RegeneratorApp {
    regenerator: CredentialRegenerator<CredentialStorage>,
}

impl RegeneratorApp {
    /// Build the regenerator application from configuration
    pub async fn from_config(config: RegeneratorConfig) -> Result<Self> {
        info!(
            "Initializing regenerator with {} configured credentials",
            config.credentials.len()
        );

        let credential_storage = config
            .credential_storage
            .build_credential_storage()
            .context("Failed to initialize credential storage")?;
        let regenerator = CredentialRegenerator::new(
            credential_storage,
            config.retry.policy(),
            config.bulk.settings(),
        );

        populate_credentials(&regenerator, &config.credentials).await?;

        Ok(Self { regenerator })
    }

    /// Handler serving regeneration requests; clones share the same repository
    pub fn handler(&self) -> CredentialRegenerator<CredentialStorage> {
        self.regenerator.clone()
    }

    /// Cancel in-flight bulk regenerations
    pub fn shutdown(&self) {
        info!("Shutting down regenerator");
        self.regenerator.shutdown();
    }
}

/// Generate every configured credential that is not already stored. Existing credentials are
/// left untouched.
async fn populate_credentials<CR: CredentialRepository>(
    regenerator: &CredentialRegenerator<CR>,
    credentials: &[CredentialConfig],
) -> Result<()> {
    for credential_config in credentials {
        let name = credential_config.credential_name()?;

        let existing = regenerator
            .repository()
            .find_latest(&name)
            .await
            .with_context(|| format!("Failed to read credential {} from repository", name))?;
        if existing.is_some() {
            info!(credential = %name, "Using existing credential from repository (no changes)");
            continue;
        }

        let version = regenerator
            .generate_credential(&name, &credential_config.parameters)
            .await
            .with_context(|| format!("Failed to generate configured credential {}", name))?;
        info!(
            credential = %name,
            version_id = %version.version_id,
            "Generated configured credential"
        );
    }
    Ok(())
}

use std::{collections::HashSet, time::Duration};

use credregen_common::{
    BulkRegenerateFailure, BulkRegenerateResults, CredentialName, CredentialValue,
    CredentialVersion, CredentialView, GenerationParameters, RegenerateError, RegenerateHandler,
    storage::credentials::CredentialRepository,
};
use futures_util::{StreamExt, stream};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::{
    generators::{self, CertificateAuthority, GenerationError},
    retry::{RetryPolicy, retry_transient},
};

/// Limits applied to a single bulk regeneration request
#[derive(Clone, Debug, PartialEq)]
pub struct BulkRegenerationSettings {
    pub timeout: Duration,
    /// Credentials regenerated concurrently within one level of the signing tree
    pub max_concurrency: usize,
}

impl Default for BulkRegenerationSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            max_concurrency: 8,
        }
    }
}

/// Produces new versions of stored credentials from their generation parameters.
#[derive(Clone, Debug)]
pub struct CredentialRegenerator<CR: CredentialRepository> {
    repository: CR,
    retry_policy: RetryPolicy,
    bulk_settings: BulkRegenerationSettings,
    shutdown_tx: broadcast::Sender<()>,
}

impl<CR: CredentialRepository> CredentialRegenerator<CR> {
    pub fn new(
        repository: CR,
        retry_policy: RetryPolicy,
        bulk_settings: BulkRegenerationSettings,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            repository,
            retry_policy,
            bulk_settings,
            shutdown_tx,
        }
    }

    pub fn repository(&self) -> &CR {
        &self.repository
    }

    /// Cancel every in-flight bulk regeneration. Versions already saved are kept.
    pub fn shutdown(&self) {
        match self.shutdown_tx.send(()) {
            Ok(in_flight) => info!(in_flight, "Cancelling in-flight bulk regenerations"),
            Err(_) => debug!("No bulk regenerations in flight"),
        }
    }

    /// Creates a new version of `name` from `parameters`, starting a new credential if none
    /// exists yet.
    #[instrument(level = "info", skip(self, parameters), fields(credential = %name))]
    pub async fn generate_credential(
        &self,
        name: &CredentialName,
        parameters: &GenerationParameters,
    ) -> Result<CredentialVersion, RegenerateError> {
        parameters
            .validate()
            .map_err(|e| RegenerateError::Generation(e.to_string()))?;

        let value = self.generate_value(name, parameters).await?;
        let version = match self.find_latest(name).await? {
            Some(existing) => CredentialVersion {
                generation_parameters: Some(parameters.clone()),
                ..existing.next_version(value)
            },
            None => CredentialVersion::new(name.clone(), value, Some(parameters.clone())),
        };
        self.save(&version).await?;

        info!(
            version_id = %version.version_id,
            credential_type = %version.credential_type(),
            "Generated credential"
        );
        Ok(version)
    }

    /// Replaces the current value of `name` with fresh material generated from the
    /// parameters stored on its latest version.
    #[instrument(level = "info", skip(self), fields(credential = %name))]
    pub async fn regenerate_credential(
        &self,
        name: &CredentialName,
    ) -> Result<CredentialVersion, RegenerateError> {
        let current = self
            .find_latest(name)
            .await?
            .ok_or_else(|| RegenerateError::NotFound(name.clone()))?;

        let credential_type = current.credential_type();
        if !credential_type.is_generatable() {
            return Err(RegenerateError::unsupported_type(name, credential_type));
        }
        let Some(parameters) = &current.generation_parameters else {
            return Err(RegenerateError::Unsupported {
                name: name.clone(),
                reason: "credential has no generation parameters".to_string(),
            });
        };

        let value = self.generate_value(name, parameters).await?;
        let next = current.next_version(value);
        self.save(&next).await?;

        info!(
            version_id = %next.version_id,
            credential_type = %credential_type,
            "Regenerated credential"
        );
        Ok(next)
    }

    /// Regenerates every credential signed by `signer`, then everything signed by each
    /// regenerated intermediate authority, one level of the signing tree at a time.
    ///
    /// A failed credential is reported and the walk continues; credentials below a failed
    /// authority are not visited.
    #[instrument(level = "info", skip(self), fields(signer = %signer))]
    pub async fn regenerate_signed_by(
        &self,
        signer: &CredentialName,
    ) -> Result<BulkRegenerateResults, RegenerateError> {
        if self.find_latest(signer).await?.is_none() {
            return Err(RegenerateError::NotFound(signer.clone()));
        }

        let mut results = BulkRegenerateResults::default();
        let mut visited = HashSet::from([signer.clone()]);
        let mut signers = vec![signer.clone()];

        while !signers.is_empty() {
            let mut targets = Vec::new();
            for current_signer in &signers {
                let signed = retry_transient(&self.retry_policy, "find_signed_by", || {
                    self.repository.find_signed_by(current_signer)
                })
                .await?;
                targets.extend(signed.into_iter().filter(|name| visited.insert(name.clone())));
            }
            targets.sort();
            debug!(count = targets.len(), "Regenerating level of signing tree");

            let pending: Vec<_> = targets
                .into_iter()
                .map(|name| self.regenerate_entry(name))
                .collect();
            let outcomes: Vec<_> = stream::iter(pending)
                .buffered(self.bulk_settings.max_concurrency.max(1))
                .collect()
                .await;

            signers = Vec::new();
            for (name, outcome) in outcomes {
                match outcome {
                    Ok(version) => {
                        if version.is_certificate_authority() {
                            signers.push(name.clone());
                        }
                        results.regenerated_credentials.push(name);
                    }
                    Err(e) => {
                        warn!(credential = %name, error = %e, "Failed to regenerate credential");
                        results.failed_credentials.push(BulkRegenerateFailure {
                            name,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        if results.is_empty() {
            return Err(RegenerateError::NoSignedCredentials(signer.clone()));
        }
        info!(
            regenerated = results.regenerated_credentials.len(),
            failed = results.failed_credentials.len(),
            "Bulk regeneration complete"
        );
        Ok(results)
    }

    async fn regenerate_entry(
        &self,
        name: CredentialName,
    ) -> (CredentialName, Result<CredentialVersion, RegenerateError>) {
        let outcome = self.regenerate_credential(&name).await;
        (name, outcome)
    }

    async fn generate_value(
        &self,
        name: &CredentialName,
        parameters: &GenerationParameters,
    ) -> Result<CredentialValue, RegenerateError> {
        let signer = match parameters {
            GenerationParameters::Certificate(params) => match &params.ca {
                Some(ca_name) => Some(self.resolve_signer(name, ca_name).await?),
                None => None,
            },
            _ => None,
        };
        generators::generate_value(parameters, signer.as_ref())
            .map_err(|e| RegenerateError::Generation(e.to_string()))
    }

    async fn resolve_signer(
        &self,
        name: &CredentialName,
        ca_name: &CredentialName,
    ) -> Result<CertificateAuthority, RegenerateError> {
        let ca_version = self
            .find_latest(ca_name)
            .await?
            .ok_or_else(|| RegenerateError::NotFound(ca_name.clone()))?;
        CertificateAuthority::from_version(&ca_version).map_err(|e| match e {
            GenerationError::NotCertificateAuthority(_) => RegenerateError::Unsupported {
                name: name.clone(),
                reason: format!("signer {ca_name} is not a certificate authority"),
            },
            other => RegenerateError::Generation(other.to_string()),
        })
    }

    async fn find_latest(
        &self,
        name: &CredentialName,
    ) -> Result<Option<CredentialVersion>, RegenerateError> {
        Ok(
            retry_transient(&self.retry_policy, "find_latest", || {
                self.repository.find_latest(name)
            })
            .await?,
        )
    }

    async fn save(&self, version: &CredentialVersion) -> Result<(), RegenerateError> {
        retry_transient(&self.retry_policy, "save_version", || {
            self.repository.save_version(version.clone())
        })
        .await?;
        Ok(())
    }
}

impl<CR: CredentialRepository> RegenerateHandler for CredentialRegenerator<CR> {
    async fn handle_regenerate(
        &self,
        credential_name: &str,
    ) -> Result<CredentialView, RegenerateError> {
        let name = CredentialName::parse(credential_name)?;
        let version = self.regenerate_credential(&name).await?;
        Ok(CredentialView::from(version))
    }

    async fn handle_bulk_regenerate(
        &self,
        signer_name: &str,
    ) -> Result<BulkRegenerateResults, RegenerateError> {
        let signer = CredentialName::parse(signer_name)?;
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let timeout = self.bulk_settings.timeout;

        tokio::select! {
            _ = shutdown_rx.recv() => {
                warn!(signer = %signer, "Bulk regeneration cancelled by shutdown");
                Err(RegenerateError::Cancelled)
            }
            result = tokio::time::timeout(timeout, self.regenerate_signed_by(&signer)) => {
                match result {
                    Ok(results) => results,
                    Err(_) => {
                        warn!(signer = %signer, ?timeout, "Bulk regeneration timed out");
                        Err(RegenerateError::Timeout(timeout))
                    }
                }
            }
        }
    }
}

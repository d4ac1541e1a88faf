use std::{future::Future, time::Duration};

use thiserror::Error;

use crate::{
    BulkRegenerateResults, CredentialName, CredentialType, CredentialView, InvalidCredentialName,
    storage::credentials::CredentialRepositoryError,
};

#[derive(Clone, Debug, Error)]
pub enum RegenerateError {
    #[error("{0}")]
    InvalidName(#[from] InvalidCredentialName),
    #[error("Credential not found: {0}")]
    NotFound(CredentialName),
    #[error("No credentials are signed by {0}")]
    NoSignedCredentials(CredentialName),
    #[error("Credential {name} cannot be regenerated: {reason}")]
    Unsupported { name: CredentialName, reason: String },
    #[error("Credential store unavailable: {0}")]
    Transient(String),
    #[error("Generation error: {0}")]
    Generation(String),
    #[error("Bulk regeneration timed out after {0:?}")]
    Timeout(Duration),
    #[error("Regeneration cancelled by shutdown")]
    Cancelled,
    #[error("Repository error: {0}")]
    Repository(CredentialRepositoryError),
}

impl RegenerateError {
    pub fn unsupported_type(name: &CredentialName, credential_type: CredentialType) -> Self {
        RegenerateError::Unsupported {
            name: name.clone(),
            reason: format!("credentials of type {credential_type} are not generated"),
        }
    }

    /// Unknown credential or signer
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RegenerateError::NotFound(_) | RegenerateError::NoSignedCredentials(_)
        )
    }
}

impl From<CredentialRepositoryError> for RegenerateError {
    fn from(err: CredentialRepositoryError) -> Self {
        if err.is_transient() {
            RegenerateError::Transient(err.to_string())
        } else {
            RegenerateError::Repository(err)
        }
    }
}

/// Entry point for credential regeneration requests.
///
/// Implemented by the production regenerator and by test doubles; callers such as the
/// HTTP layer only depend on this trait.
pub trait RegenerateHandler: Clone + Send + Sync + 'static {
    /// Produces a new version of the named credential
    fn handle_regenerate(
        &self,
        credential_name: &str,
    ) -> impl Future<Output = Result<CredentialView, RegenerateError>> + Send;

    /// Regenerates every credential signed by `signer_name`
    fn handle_bulk_regenerate(
        &self,
        signer_name: &str,
    ) -> impl Future<Output = Result<BulkRegenerateResults, RegenerateError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_repository_errors_stay_retryable() {
        let err: RegenerateError = CredentialRepositoryError::Unavailable("down".to_string()).into();
        assert!(matches!(err, RegenerateError::Transient(_)));

        let err: RegenerateError = CredentialRepositoryError::PoisonedLock.into();
        assert!(matches!(
            err,
            RegenerateError::Repository(CredentialRepositoryError::PoisonedLock)
        ));
    }

    #[test]
    fn test_not_found_classification() {
        let name = CredentialName::parse("/ca").unwrap();
        assert!(RegenerateError::NotFound(name.clone()).is_not_found());
        assert!(RegenerateError::NoSignedCredentials(name.clone()).is_not_found());
        assert!(!RegenerateError::unsupported_type(&name, CredentialType::Value).is_not_found());
        assert_eq!(
            RegenerateError::unsupported_type(&name, CredentialType::Json).to_string(),
            "Credential /ca cannot be regenerated: credentials of type json are not generated"
        );
    }
}

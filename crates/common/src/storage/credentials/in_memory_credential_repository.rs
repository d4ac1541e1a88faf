use std::sync::{Arc, RwLock};

use tracing::{debug, instrument};

use crate::{
    CredentialName, CredentialVersion,
    storage::credentials::{CredentialRepository, CredentialRepositoryError, CredentialState},
};

type Result<T> = std::result::Result<T, CredentialRepositoryError>;

#[derive(Clone, Debug, Default)]
pub struct InMemoryCredentialRepository {
    state: Arc<RwLock<CredentialState>>,
}

impl InMemoryCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialRepository for InMemoryCredentialRepository {
    async fn find_latest(&self, name: &CredentialName) -> Result<Option<CredentialVersion>> {
        let state = self
            .state
            .read()
            .map_err(|_| CredentialRepositoryError::PoisonedLock)?;
        Ok(state.find_latest(name))
    }

    async fn find_versions(&self, name: &CredentialName) -> Result<Vec<CredentialVersion>> {
        let state = self
            .state
            .read()
            .map_err(|_| CredentialRepositoryError::PoisonedLock)?;
        Ok(state.find_versions(name))
    }

    #[instrument(level = "debug", skip_all, fields(credential = %version.name))]
    async fn save_version(&self, version: CredentialVersion) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| CredentialRepositoryError::PoisonedLock)?;
        debug!(version_id = %version.version_id, "Appending credential version");
        state.append(version);
        Ok(())
    }

    async fn find_signed_by(&self, signer: &CredentialName) -> Result<Vec<CredentialName>> {
        let state = self
            .state
            .read()
            .map_err(|_| CredentialRepositoryError::PoisonedLock)?;
        Ok(state.find_signed_by(signer))
    }
}

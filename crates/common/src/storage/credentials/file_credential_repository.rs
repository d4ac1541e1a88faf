use std::sync::{Arc, RwLock};

use tracing::{debug, instrument, trace};

use crate::{
    CredentialName, CredentialVersion,
    storage::credentials::{
        CredentialRepository, CredentialRepositoryError, CredentialRepositoryInitializationError,
        CredentialRepositoryPersistenceError, CredentialState,
    },
};

type Result<T> = std::result::Result<T, CredentialRepositoryError>;

/// Credential repository persisting every version to a single JSON state file.
#[derive(Clone, Debug)]
pub struct FileCredentialRepository {
    file_path: String,
    state: Arc<RwLock<CredentialState>>,
}

impl FileCredentialRepository {
    pub fn new(file_path: String) -> std::result::Result<Self, CredentialRepositoryInitializationError> {
        // Load existing credentials from file, if it exists
        let state = if std::path::Path::new(&file_path).exists() {
            Self::load_file(&file_path)?
        } else {
            CredentialState::default()
        };

        Ok(Self {
            file_path,
            state: Arc::new(RwLock::new(state)),
        })
    }

    fn load_file(
        file_path: &str,
    ) -> std::result::Result<CredentialState, CredentialRepositoryInitializationError> {
        let file_content = std::fs::read_to_string(file_path).map_err(|e| {
            CredentialRepositoryInitializationError(format!("Failed to read file: {}", e))
        })?;
        debug!("Loaded credential file content");
        let state: CredentialState = serde_json::from_str(&file_content).map_err(|e| {
            CredentialRepositoryInitializationError(format!("Failed to parse file: {}", e))
        })?;
        debug!("Parsed {} credentials from file", state.len());
        Ok(state)
    }

    fn persist(
        &self,
        locked_state: &CredentialState,
    ) -> std::result::Result<(), CredentialRepositoryPersistenceError> {
        trace!("Persisting credentials to file: {}", self.file_path);
        let serialized = serde_json::to_string(locked_state).map_err(|e| {
            CredentialRepositoryPersistenceError(format!("Failed to serialize credentials: {}", e))
        })?;
        // state file is only ever replaced whole
        let staging_path = format!("{}.tmp", self.file_path);
        std::fs::write(&staging_path, serialized).map_err(|e| {
            CredentialRepositoryPersistenceError(format!("Failed to write to file: {}", e))
        })?;
        std::fs::rename(&staging_path, &self.file_path).map_err(|e| {
            CredentialRepositoryPersistenceError(format!("Failed to replace file: {}", e))
        })?;
        debug!("Successfully persisted {} credentials", locked_state.len());
        Ok(())
    }
}

impl CredentialRepository for FileCredentialRepository {
    #[instrument(level = "debug", skip(self))]
    async fn find_latest(&self, name: &CredentialName) -> Result<Option<CredentialVersion>> {
        let state = self
            .state
            .read()
            .map_err(|_| CredentialRepositoryError::PoisonedLock)?;
        Ok(state.find_latest(name))
    }

    #[instrument(level = "debug", skip(self))]
    async fn find_versions(&self, name: &CredentialName) -> Result<Vec<CredentialVersion>> {
        let state = self
            .state
            .read()
            .map_err(|_| CredentialRepositoryError::PoisonedLock)?;
        Ok(state.find_versions(name))
    }

    #[instrument(level = "info", skip_all, fields(credential = %version.name, version_id = %version.version_id))]
    async fn save_version(&self, version: CredentialVersion) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| CredentialRepositoryError::PoisonedLock)?;
        let mut updated = state.clone();
        updated.append(version);
        // Only publish the new version once it is on disk
        self.persist(&updated)?;
        *state = updated;
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn find_signed_by(&self, signer: &CredentialName) -> Result<Vec<CredentialName>> {
        let state = self
            .state
            .read()
            .map_err(|_| CredentialRepositoryError::PoisonedLock)?;
        Ok(state.find_signed_by(signer))
    }
}

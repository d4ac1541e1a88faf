mod credential_state;
mod file_credential_repository;
mod in_memory_credential_repository;

pub(crate) use credential_state::CredentialState;
pub use file_credential_repository::FileCredentialRepository;
pub use in_memory_credential_repository::InMemoryCredentialRepository;

use std::{fmt::Debug, future::Future};

use thiserror::Error;

use crate::{CredentialName, CredentialVersion};

#[derive(Clone, Debug, Error)]
pub enum CredentialRepositoryError {
    /// The backing store could not be reached. Callers may retry.
    #[error("Credential store unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    PersistenceError(#[from] CredentialRepositoryPersistenceError),
    #[error("Credential store lock poisoned")]
    PoisonedLock,
}

impl CredentialRepositoryError {
    pub fn is_transient(&self) -> bool {
        matches!(self, CredentialRepositoryError::Unavailable(_))
    }
}

#[derive(Clone, Debug, Error)]
#[error("Initialization error: {0}")]
pub struct CredentialRepositoryInitializationError(pub String);

#[derive(Clone, Debug, Error)]
#[error("Persistence error: {0}")]
pub struct CredentialRepositoryPersistenceError(pub String);

type Result<T> = std::result::Result<T, CredentialRepositoryError>;

/// Versioned credential store. Versions are only ever appended.
pub trait CredentialRepository: Clone + Debug + Send + Sync + 'static {
    /// Most recent version of the named credential
    fn find_latest(
        &self,
        name: &CredentialName,
    ) -> impl Future<Output = Result<Option<CredentialVersion>>> + Send;
    /// All versions of the named credential, newest first
    fn find_versions(
        &self,
        name: &CredentialName,
    ) -> impl Future<Output = Result<Vec<CredentialVersion>>> + Send;
    /// Appends a version. The version becomes the latest for its name.
    fn save_version(&self, version: CredentialVersion) -> impl Future<Output = Result<()>> + Send;
    /// Names of credentials whose latest version is signed by `signer`, sorted by name
    fn find_signed_by(
        &self,
        signer: &CredentialName,
    ) -> impl Future<Output = Result<Vec<CredentialName>>> + Send;
}

/// Enum wrapper to support different credential repository implementations
///
/// This enum allows applications to pick a storage backend for credentials
/// (File-based or InMemory) based on configuration.
#[derive(Clone, Debug)]
pub enum CredentialStorage {
    File(FileCredentialRepository),
    InMemory(InMemoryCredentialRepository),
    #[cfg(any(test, feature = "testing"))]
    Mock(crate::testing::MockCredentialRepository),
}

impl CredentialRepository for CredentialStorage {
    async fn find_latest(&self, name: &CredentialName) -> Result<Option<CredentialVersion>> {
        match self {
            CredentialStorage::File(repo) => repo.find_latest(name).await,
            CredentialStorage::InMemory(repo) => repo.find_latest(name).await,
            #[cfg(any(test, feature = "testing"))]
            CredentialStorage::Mock(repo) => repo.find_latest(name).await,
        }
    }

    async fn find_versions(&self, name: &CredentialName) -> Result<Vec<CredentialVersion>> {
        match self {
            CredentialStorage::File(repo) => repo.find_versions(name).await,
            CredentialStorage::InMemory(repo) => repo.find_versions(name).await,
            #[cfg(any(test, feature = "testing"))]
            CredentialStorage::Mock(repo) => repo.find_versions(name).await,
        }
    }

    async fn save_version(&self, version: CredentialVersion) -> Result<()> {
        match self {
            CredentialStorage::File(repo) => repo.save_version(version).await,
            CredentialStorage::InMemory(repo) => repo.save_version(version).await,
            #[cfg(any(test, feature = "testing"))]
            CredentialStorage::Mock(repo) => repo.save_version(version).await,
        }
    }

    async fn find_signed_by(&self, signer: &CredentialName) -> Result<Vec<CredentialName>> {
        match self {
            CredentialStorage::File(repo) => repo.find_signed_by(signer).await,
            CredentialStorage::InMemory(repo) => repo.find_signed_by(signer).await,
            #[cfg(any(test, feature = "testing"))]
            CredentialStorage::Mock(repo) => repo.find_signed_by(signer).await,
        }
    }
}

use std::{
    collections::HashSet,
    sync::{
        Arc, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use crate::{
    CredentialName, CredentialVersion,
    storage::credentials::{
        CredentialRepository, CredentialRepositoryError, CredentialRepositoryPersistenceError,
        CredentialState,
    },
};

type Result<T> = std::result::Result<T, CredentialRepositoryError>;

/// Mock credential repository for testing
#[derive(Clone, Debug, Default)]
pub struct MockCredentialRepository {
    state: Arc<RwLock<CredentialState>>,
    should_fail: Arc<RwLock<bool>>,
    transient_failures: Arc<AtomicUsize>,
    failing_saves: Arc<RwLock<HashSet<String>>>,
    delay: Arc<RwLock<Option<Duration>>>,
    call_count: Arc<AtomicUsize>,
    save_count: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a version directly, bypassing failure modes and counters
    pub fn add_test_version(&self, version: CredentialVersion) {
        self.state.write().unwrap().append(version);
    }

    /// Set whether every operation should fail permanently
    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.write().unwrap() = should_fail;
    }

    /// The next `count` operations fail with a retryable `Unavailable` error
    pub fn fail_next_transiently(&self, count: usize) {
        self.transient_failures.store(count, Ordering::SeqCst);
    }

    /// Saving a version of `name` fails permanently
    pub fn fail_saves_for(&self, name: &CredentialName) {
        self.failing_saves.write().unwrap().insert(name.lookup_key());
    }

    /// Delay every operation, to exercise timeouts and cancellation
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().unwrap() = delay;
    }

    /// Number of operations attempted, including failed ones
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Number of versions successfully saved through the trait
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// Highest number of operations observed running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn before_operation(&self) -> Result<()> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let delay = *self.delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if *self.should_fail.read().unwrap() {
            return Err(CredentialRepositoryError::PersistenceError(
                CredentialRepositoryPersistenceError("Mock failure".to_string()),
            ));
        }

        let consumed = self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok();
        if consumed {
            return Err(CredentialRepositoryError::Unavailable(
                "Mock transient failure".to_string(),
            ));
        }
        Ok(())
    }
}

impl CredentialRepository for MockCredentialRepository {
    async fn find_latest(&self, name: &CredentialName) -> Result<Option<CredentialVersion>> {
        self.before_operation().await?;
        Ok(self.state.read().unwrap().find_latest(name))
    }

    async fn find_versions(&self, name: &CredentialName) -> Result<Vec<CredentialVersion>> {
        self.before_operation().await?;
        Ok(self.state.read().unwrap().find_versions(name))
    }

    async fn save_version(&self, version: CredentialVersion) -> Result<()> {
        self.before_operation().await?;
        if self
            .failing_saves
            .read()
            .unwrap()
            .contains(&version.name.lookup_key())
        {
            return Err(CredentialRepositoryError::PersistenceError(
                CredentialRepositoryPersistenceError(format!(
                    "Mock save failure for {}",
                    version.name
                )),
            ));
        }
        self.state.write().unwrap().append(version);
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_signed_by(&self, signer: &CredentialName) -> Result<Vec<CredentialName>> {
        self.before_operation().await?;
        Ok(self.state.read().unwrap().find_signed_by(signer))
    }
}

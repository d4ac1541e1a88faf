use std::sync::{Arc, RwLock};

use crate::{
    BulkRegenerateResults, CredentialName, CredentialView, RegenerateError, RegenerateHandler,
};

/// Records the last arguments passed to each [`RegenerateHandler`] operation.
///
/// Returns configured responses when set, otherwise an empty view and empty bulk results.
/// Arguments are never validated. Clones share recorded state.
#[derive(Clone, Debug, Default)]
pub struct SpyRegenerateHandler {
    state: Arc<RwLock<SpyState>>,
}

#[derive(Debug, Default)]
struct SpyState {
    handle_regenerate_called_with: Option<String>,
    handle_bulk_regenerate_called_with: Option<String>,
    regenerate_response: Option<CredentialView>,
    bulk_regenerate_response: Option<BulkRegenerateResults>,
    failure: Option<RegenerateError>,
}

impl SpyRegenerateHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credential name passed to the last `handle_regenerate` call
    pub fn handle_regenerate_called_with(&self) -> Option<String> {
        self.state.read().unwrap().handle_regenerate_called_with.clone()
    }

    /// Signer name passed to the last `handle_bulk_regenerate` call
    pub fn handle_bulk_regenerate_called_with(&self) -> Option<String> {
        self.state
            .read()
            .unwrap()
            .handle_bulk_regenerate_called_with
            .clone()
    }

    pub fn set_regenerate_response(&self, view: CredentialView) {
        self.state.write().unwrap().regenerate_response = Some(view);
    }

    pub fn set_bulk_regenerate_response(&self, results: BulkRegenerateResults) {
        self.state.write().unwrap().bulk_regenerate_response = Some(results);
    }

    /// Make both operations fail with `failure` after recording their argument
    pub fn set_failure(&self, failure: Option<RegenerateError>) {
        self.state.write().unwrap().failure = failure;
    }

    /// Clear recorded calls and configured responses
    pub fn reset(&self) {
        *self.state.write().unwrap() = SpyState::default();
    }
}

impl RegenerateHandler for SpyRegenerateHandler {
    async fn handle_regenerate(
        &self,
        credential_name: &str,
    ) -> Result<CredentialView, RegenerateError> {
        let mut state = self.state.write().unwrap();
        state.handle_regenerate_called_with = Some(credential_name.to_string());

        if let Some(failure) = &state.failure {
            return Err(failure.clone());
        }
        match &state.regenerate_response {
            Some(view) => Ok(view.clone()),
            None => Ok(CredentialView::empty(CredentialName::unchecked(credential_name))),
        }
    }

    async fn handle_bulk_regenerate(
        &self,
        signer_name: &str,
    ) -> Result<BulkRegenerateResults, RegenerateError> {
        let mut state = self.state.write().unwrap();
        state.handle_bulk_regenerate_called_with = Some(signer_name.to_string());

        if let Some(failure) = &state.failure {
            return Err(failure.clone());
        }
        Ok(state.bulk_regenerate_response.clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handle_regenerate_records_credential_name() {
        let spy = SpyRegenerateHandler::new();
        assert_eq!(spy.handle_regenerate_called_with(), None);

        let view = spy.handle_regenerate("db-password").await.unwrap();

        assert_eq!(
            spy.handle_regenerate_called_with().as_deref(),
            Some("db-password")
        );
        assert_eq!(view.name.as_str(), "/db-password");
        assert_eq!(spy.handle_bulk_regenerate_called_with(), None);
    }

    #[tokio::test]
    async fn test_handle_bulk_regenerate_records_signer_name() {
        let spy = SpyRegenerateHandler::new();

        let results = spy.handle_bulk_regenerate("ca-cert-1").await.unwrap();

        assert_eq!(
            spy.handle_bulk_regenerate_called_with().as_deref(),
            Some("ca-cert-1")
        );
        assert_eq!(results, BulkRegenerateResults::default());
        assert_eq!(spy.handle_regenerate_called_with(), None);
    }

    #[tokio::test]
    async fn test_handle_regenerate_accepts_names_the_regenerator_would_reject() {
        let spy = SpyRegenerateHandler::new();

        let view = spy.handle_regenerate("a//b").await.unwrap();

        assert_eq!(spy.handle_regenerate_called_with().as_deref(), Some("a//b"));
        assert_eq!(view.name.as_str(), "/a//b");
        assert_eq!(view.id, uuid::Uuid::nil());

        let results = spy.handle_bulk_regenerate("ca//").await.unwrap();
        assert_eq!(spy.handle_bulk_regenerate_called_with().as_deref(), Some("ca//"));
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_last_call_wins() {
        let spy = SpyRegenerateHandler::new();
        spy.handle_regenerate("first").await.unwrap();
        spy.handle_regenerate("second").await.unwrap();
        assert_eq!(spy.handle_regenerate_called_with().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_configured_responses_and_failures() {
        let spy = SpyRegenerateHandler::new();
        let name = CredentialName::parse("/ca-cert-1").unwrap();
        let configured = BulkRegenerateResults {
            regenerated_credentials: vec![CredentialName::parse("/leaf").unwrap()],
            failed_credentials: vec![],
        };
        spy.set_bulk_regenerate_response(configured.clone());
        assert_eq!(spy.handle_bulk_regenerate("ca-cert-1").await.unwrap(), configured);

        spy.set_failure(Some(RegenerateError::NotFound(name)));
        let err = spy.handle_regenerate("missing").await.unwrap_err();
        assert!(err.is_not_found());
        // the argument is recorded even when the call fails
        assert_eq!(spy.handle_regenerate_called_with().as_deref(), Some("missing"));
    }

    #[tokio::test]
    async fn test_clones_share_state_and_reset_clears_it() {
        let spy = SpyRegenerateHandler::new();
        let clone = spy.clone();

        clone.handle_regenerate("db-password").await.unwrap();
        assert_eq!(
            spy.handle_regenerate_called_with().as_deref(),
            Some("db-password")
        );

        spy.reset();
        assert_eq!(clone.handle_regenerate_called_with(), None);
    }
}

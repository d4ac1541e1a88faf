#![cfg(any(test, feature = "testing"))]

// Testing utilities and doubles for credregen-common
//
// This module provides test implementations of the repository and handler traits.
// The mock repository behaves like the in-memory one but can be told to fail or to
// slow down; the spy handler records the arguments it was called with.
//
// Usage:
// - Use the spy to test callers of `RegenerateHandler` (for example HTTP routes) in isolation
// - Configure failure modes on the mock repository to test retry and partial failure handling
// - Inspect recorded state to verify expected behavior

pub mod mock_credential_repository;
pub mod spy_regenerate_handler;

pub use mock_credential_repository::MockCredentialRepository;
pub use spy_regenerate_handler::SpyRegenerateHandler;

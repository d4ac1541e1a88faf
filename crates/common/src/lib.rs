mod credential;
mod credential_name;
mod generation_parameters;
mod regenerate;
mod views;
pub mod config;
pub mod crypto;
pub mod storage;
pub mod testing;

pub use credential::*;
pub use credential_name::{CredentialName, InvalidCredentialName};
pub use generation_parameters::*;
pub use regenerate::{RegenerateError, RegenerateHandler};
pub use views::{BulkRegenerateFailure, BulkRegenerateResults, CredentialView};

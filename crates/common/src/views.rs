use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CredentialName, CredentialType, CredentialValue, CredentialVersion};

/// Projection of a single credential version returned to callers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CredentialView {
    /// Version id
    pub id: Uuid,
    pub name: CredentialName,
    pub version_created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub value: CredentialValue,
}

impl CredentialView {
    /// A view carrying no material, used where a result must exist but nothing was generated
    pub fn empty(name: CredentialName) -> Self {
        Self {
            id: Uuid::nil(),
            name,
            version_created_at: DateTime::<Utc>::UNIX_EPOCH,
            value: CredentialValue::Value(String::new()),
        }
    }

    pub fn credential_type(&self) -> CredentialType {
        self.value.credential_type()
    }
}

impl From<&CredentialVersion> for CredentialView {
    fn from(version: &CredentialVersion) -> Self {
        Self {
            id: version.version_id,
            name: version.name.clone(),
            version_created_at: version.version_created_at,
            value: version.value.clone(),
        }
    }
}

impl From<CredentialVersion> for CredentialView {
    fn from(version: CredentialVersion) -> Self {
        Self {
            id: version.version_id,
            name: version.name,
            version_created_at: version.version_created_at,
            value: version.value,
        }
    }
}

/// Outcome of regenerating every credential signed by one signer.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BulkRegenerateResults {
    pub regenerated_credentials: Vec<CredentialName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_credentials: Vec<BulkRegenerateFailure>,
}

impl BulkRegenerateResults {
    pub fn is_empty(&self) -> bool {
        self.regenerated_credentials.is_empty() && self.failed_credentials.is_empty()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BulkRegenerateFailure {
    pub name: CredentialName,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_flattens_value() {
        let version = CredentialVersion::new(
            CredentialName::parse("db-password").unwrap(),
            CredentialValue::Password("hunter2".to_string()),
            None,
        );
        let view = CredentialView::from(&version);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["id"], version.version_id.to_string());
        assert_eq!(json["name"], "/db-password");
        assert_eq!(json["type"], "password");
        assert_eq!(json["value"], "hunter2");
        assert!(json["version_created_at"].is_string());
    }

    #[test]
    fn test_empty_view_references_name() {
        let view = CredentialView::empty(CredentialName::parse("/db-password").unwrap());
        assert_eq!(view.name.as_str(), "/db-password");
        assert!(view.id.is_nil());
        assert_eq!(view.credential_type(), CredentialType::Value);
    }

    #[test]
    fn test_bulk_results_omit_empty_failures() {
        let results = BulkRegenerateResults {
            regenerated_credentials: vec![CredentialName::parse("/leaf").unwrap()],
            failed_credentials: vec![],
        };
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["regenerated_credentials"][0], "/leaf");
        assert!(json.get("failed_credentials").is_none());
        assert!(!results.is_empty());
        assert!(BulkRegenerateResults::default().is_empty());
    }
}

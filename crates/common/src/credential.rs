use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CredentialName, GenerationParameters, crypto::SignedCertificate};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CredentialType {
    Value,
    Json,
    Password,
    User,
    Certificate,
    Ssh,
}

impl CredentialType {
    /// Whether credentials of this type can be produced from generation parameters
    pub fn is_generatable(&self) -> bool {
        !matches!(self, CredentialType::Value | CredentialType::Json)
    }
}

impl Display for CredentialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CredentialType::Value => "value",
            CredentialType::Json => "json",
            CredentialType::Password => "password",
            CredentialType::User => "user",
            CredentialType::Certificate => "certificate",
            CredentialType::Ssh => "ssh",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CredentialValue {
    Value(String),
    Json(serde_json::Value),
    Password(String),
    User(UserValue),
    Certificate(CertificateValue),
    Ssh(SshValue),
}

impl CredentialValue {
    pub fn credential_type(&self) -> CredentialType {
        match self {
            CredentialValue::Value(_) => CredentialType::Value,
            CredentialValue::Json(_) => CredentialType::Json,
            CredentialValue::Password(_) => CredentialType::Password,
            CredentialValue::User(_) => CredentialType::User,
            CredentialValue::Certificate(_) => CredentialType::Certificate,
            CredentialValue::Ssh(_) => CredentialType::Ssh,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserValue {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CertificateValue {
    /// Certificate of the signing authority
    pub ca: Option<String>,
    /// Name of the credential holding the signing authority
    pub ca_name: Option<CredentialName>,
    pub certificate: String,
    pub private_key: String,
}

impl CertificateValue {
    /// Whether this certificate may sign other certificates
    pub fn is_certificate_authority(&self) -> bool {
        SignedCertificate::decode(&self.certificate)
            .map(|certificate| certificate.body.is_ca)
            .unwrap_or(false)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SshValue {
    pub public_key: String,
    pub private_key: String,
}

/// One immutable version of a stored credential.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CredentialVersion {
    /// Unique per version
    pub version_id: Uuid,
    /// Shared by every version of the same credential
    pub credential_id: Uuid,
    pub name: CredentialName,
    pub value: CredentialValue,
    pub generation_parameters: Option<GenerationParameters>,
    pub version_created_at: DateTime<Utc>,
}

impl CredentialVersion {
    /// First version of a new credential
    pub fn new(
        name: CredentialName,
        value: CredentialValue,
        generation_parameters: Option<GenerationParameters>,
    ) -> Self {
        Self {
            version_id: Uuid::new_v4(),
            credential_id: Uuid::new_v4(),
            name,
            value,
            generation_parameters,
            version_created_at: Utc::now(),
        }
    }

    /// Successor version carrying fresh material for the same credential
    pub fn next_version(&self, value: CredentialValue) -> Self {
        Self {
            version_id: Uuid::new_v4(),
            credential_id: self.credential_id,
            name: self.name.clone(),
            value,
            generation_parameters: self.generation_parameters.clone(),
            version_created_at: Utc::now(),
        }
    }

    pub fn credential_type(&self) -> CredentialType {
        self.value.credential_type()
    }

    /// Name of the certificate authority that signed this version, if any
    pub fn signed_by(&self) -> Option<&CredentialName> {
        match &self.value {
            CredentialValue::Certificate(certificate) => certificate.ca_name.as_ref(),
            _ => None,
        }
    }

    pub fn is_certificate_authority(&self) -> bool {
        match &self.value {
            CredentialValue::Certificate(certificate) => certificate.is_certificate_authority(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        StringGenerationParameters,
        crypto::{CertificateBody, KeyPair},
    };

    fn name(raw: &str) -> CredentialName {
        CredentialName::parse(raw).unwrap()
    }

    #[test]
    fn test_next_version_keeps_identity_and_parameters() {
        let params = GenerationParameters::Password(StringGenerationParameters::default());
        let first = CredentialVersion::new(
            name("/db-password"),
            CredentialValue::Password("first".to_string()),
            Some(params.clone()),
        );
        let second = first.next_version(CredentialValue::Password("second".to_string()));

        assert_eq!(second.credential_id, first.credential_id);
        assert_ne!(second.version_id, first.version_id);
        assert_eq!(second.name, first.name);
        assert_eq!(second.generation_parameters, Some(params));
        assert!(second.version_created_at >= first.version_created_at);
    }

    #[test]
    fn test_generatable_types() {
        assert!(!CredentialType::Value.is_generatable());
        assert!(!CredentialType::Json.is_generatable());
        assert!(CredentialType::Password.is_generatable());
        assert!(CredentialType::User.is_generatable());
        assert!(CredentialType::Certificate.is_generatable());
        assert!(CredentialType::Ssh.is_generatable());
    }

    #[test]
    fn test_value_serializes_with_type_tag() {
        let value = CredentialValue::User(UserValue {
            username: "picard".to_string(),
            password: "enterprise".to_string(),
        });
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["type"], "user");
        assert_eq!(json["value"]["username"], "picard");
    }

    #[test]
    fn test_signed_by_and_certificate_authority() {
        let key_pair = KeyPair::generate();
        let body = CertificateBody::new(
            "root".to_string(),
            "root".to_string(),
            key_pair.public_key_hex(),
            true,
            chrono::Duration::days(1),
        );
        let certificate = SignedCertificate::issue(body, &key_pair)
            .unwrap()
            .encode()
            .unwrap();

        let ca = CredentialVersion::new(
            name("/root-ca"),
            CredentialValue::Certificate(CertificateValue {
                ca: Some(certificate.clone()),
                ca_name: None,
                certificate: certificate.clone(),
                private_key: key_pair.private_key_hex(),
            }),
            None,
        );
        assert!(ca.is_certificate_authority());
        assert_eq!(ca.signed_by(), None);

        let leaf = CredentialVersion::new(
            name("/leaf"),
            CredentialValue::Certificate(CertificateValue {
                ca: Some(certificate),
                ca_name: Some(name("/root-ca")),
                certificate: "-----BEGIN CERTIFICATE-----\nnot hex\n-----END CERTIFICATE-----"
                    .to_string(),
                private_key: String::new(),
            }),
            None,
        );
        assert!(!leaf.is_certificate_authority());
        assert_eq!(leaf.signed_by(), Some(&name("/ROOT-CA")));
    }
}

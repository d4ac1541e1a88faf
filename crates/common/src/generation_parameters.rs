use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CredentialName;

/// Default password length = 30 characters
const DEFAULT_PASSWORD_LENGTH: usize = 30;
const MIN_PASSWORD_LENGTH: usize = 4;
const MAX_PASSWORD_LENGTH: usize = 200;
/// Default certificate lifetime = 1 year
const DEFAULT_CERTIFICATE_DURATION_DAYS: u32 = 365;
const MAX_CERTIFICATE_DURATION_DAYS: u32 = 3650;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Invalid generation parameters: {0}")]
pub struct InvalidGenerationParameters(pub String);

/// Parameters a generated credential was created with, kept on every version so the
/// credential can be regenerated with the same shape.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GenerationParameters {
    Password(StringGenerationParameters),
    User(UserGenerationParameters),
    Certificate(CertificateGenerationParameters),
    Ssh(SshGenerationParameters),
}

impl GenerationParameters {
    pub fn validate(&self) -> Result<(), InvalidGenerationParameters> {
        match self {
            GenerationParameters::Password(params) => params.validate(),
            GenerationParameters::User(params) => params.password.validate(),
            GenerationParameters::Certificate(params) => params.validate(),
            GenerationParameters::Ssh(_) => Ok(()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StringGenerationParameters {
    /// Defaults to [`DEFAULT_PASSWORD_LENGTH`]
    #[serde(default = "default_password_length")]
    pub length: usize,
    #[serde(default)]
    pub exclude_upper: bool,
    #[serde(default)]
    pub exclude_lower: bool,
    #[serde(default)]
    pub exclude_number: bool,
    #[serde(default)]
    pub include_special: bool,
}

impl Default for StringGenerationParameters {
    fn default() -> Self {
        Self {
            length: DEFAULT_PASSWORD_LENGTH,
            exclude_upper: false,
            exclude_lower: false,
            exclude_number: false,
            include_special: false,
        }
    }
}

impl StringGenerationParameters {
    pub fn validate(&self) -> Result<(), InvalidGenerationParameters> {
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&self.length) {
            return Err(InvalidGenerationParameters(format!(
                "password length must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH}, got {}",
                self.length
            )));
        }
        if self.exclude_upper && self.exclude_lower && self.exclude_number && !self.include_special
        {
            return Err(InvalidGenerationParameters(
                "all character classes are excluded".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UserGenerationParameters {
    /// Fixed username; a random one is generated when absent
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: StringGenerationParameters,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CertificateGenerationParameters {
    pub common_name: String,
    /// Name of the certificate authority credential that signs this certificate
    #[serde(default)]
    pub ca: Option<CredentialName>,
    #[serde(default)]
    pub is_ca: bool,
    #[serde(default)]
    pub self_sign: bool,
    /// Lifetime in days
    /// Defaults to [`DEFAULT_CERTIFICATE_DURATION_DAYS`]
    #[serde(default = "default_certificate_duration")]
    pub duration: u32,
}

impl CertificateGenerationParameters {
    pub fn validate(&self) -> Result<(), InvalidGenerationParameters> {
        if self.common_name.trim().is_empty() {
            return Err(InvalidGenerationParameters(
                "certificate common_name cannot be empty".to_string(),
            ));
        }
        if self.ca.is_some() && self.self_sign {
            return Err(InvalidGenerationParameters(
                "certificate cannot set both ca and self_sign".to_string(),
            ));
        }
        if self.ca.is_none() && !self.self_sign && !self.is_ca {
            return Err(InvalidGenerationParameters(
                "certificate requires a signing ca, self_sign or is_ca".to_string(),
            ));
        }
        if !(1..=MAX_CERTIFICATE_DURATION_DAYS).contains(&self.duration) {
            return Err(InvalidGenerationParameters(format!(
                "certificate duration must be between 1 and {MAX_CERTIFICATE_DURATION_DAYS} days, got {}",
                self.duration
            )));
        }
        Ok(())
    }

    /// Whether the certificate signs itself rather than being issued by `ca`
    pub fn is_self_signed(&self) -> bool {
        self.ca.is_none()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SshGenerationParameters {
    #[serde(default)]
    pub ssh_comment: Option<String>,
}

fn default_password_length() -> usize {
    DEFAULT_PASSWORD_LENGTH
}

fn default_certificate_duration() -> u32 {
    DEFAULT_CERTIFICATE_DURATION_DAYS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn certificate_params() -> CertificateGenerationParameters {
        CertificateGenerationParameters {
            common_name: "leaf.example.com".to_string(),
            ca: Some(CredentialName::parse("/example-ca").unwrap()),
            is_ca: false,
            self_sign: false,
            duration: 365,
        }
    }

    #[test]
    fn test_string_parameter_validation() {
        assert!(StringGenerationParameters::default().validate().is_ok());

        let too_short = StringGenerationParameters {
            length: 3,
            ..Default::default()
        };
        let result = too_short.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("between 4 and 200"));

        let too_long = StringGenerationParameters {
            length: 201,
            ..Default::default()
        };
        assert!(too_long.validate().is_err());

        let nothing_left = StringGenerationParameters {
            exclude_upper: true,
            exclude_lower: true,
            exclude_number: true,
            ..Default::default()
        };
        assert!(nothing_left.validate().is_err());

        let only_special = StringGenerationParameters {
            include_special: true,
            ..nothing_left
        };
        assert!(only_special.validate().is_ok());
    }

    #[test]
    fn test_certificate_parameter_validation() {
        assert!(certificate_params().validate().is_ok());

        let no_signer = CertificateGenerationParameters {
            ca: None,
            ..certificate_params()
        };
        assert!(no_signer.validate().is_err());

        let root = CertificateGenerationParameters {
            ca: None,
            is_ca: true,
            ..certificate_params()
        };
        assert!(root.validate().is_ok());
        assert!(root.is_self_signed());

        let conflicting = CertificateGenerationParameters {
            self_sign: true,
            ..certificate_params()
        };
        assert!(conflicting.validate().is_err());

        let blank_name = CertificateGenerationParameters {
            common_name: "  ".to_string(),
            ..certificate_params()
        };
        assert!(blank_name.validate().is_err());

        let forever = CertificateGenerationParameters {
            duration: 3651,
            ..certificate_params()
        };
        assert!(forever.validate().is_err());
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let params: GenerationParameters =
            serde_json::from_str(r#"{"type":"password"}"#).unwrap();
        assert_eq!(
            params,
            GenerationParameters::Password(StringGenerationParameters::default())
        );

        let params: GenerationParameters = serde_json::from_str(
            r#"{"type":"certificate","common_name":"leaf","ca":"example-ca"}"#,
        )
        .unwrap();
        match params {
            GenerationParameters::Certificate(cert) => {
                assert_eq!(cert.duration, 365);
                assert_eq!(cert.ca.unwrap().as_str(), "/example-ca");
            }
            other => panic!("unexpected parameters: {other:?}"),
        }
    }
}

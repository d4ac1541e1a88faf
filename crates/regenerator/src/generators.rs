use chrono::Duration;
use credregen_common::{
    CertificateGenerationParameters, CertificateValue, CredentialName, CredentialValue,
    CredentialVersion, GenerationParameters, InvalidGenerationParameters,
    SshGenerationParameters, SshValue, StringGenerationParameters, UserGenerationParameters,
    UserValue,
    crypto::{CertificateBody, CryptoError, KeyPair, SignedCertificate},
};
use rand::{Rng, seq::SliceRandom};
use thiserror::Error;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";
const GENERATED_USERNAME_LENGTH: usize = 20;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    InvalidParameters(#[from] InvalidGenerationParameters),
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
    #[error("{0} is not a certificate authority")]
    NotCertificateAuthority(CredentialName),
    #[error("Certificate {0} requires its signing certificate authority")]
    MissingSigner(String),
}

/// Random string drawn from the enabled character classes, containing at least one
/// character of each.
pub fn generate_password(params: &StringGenerationParameters) -> Result<String, GenerationError> {
    params.validate()?;

    let classes: Vec<&[u8]> = [
        (!params.exclude_upper, UPPERCASE),
        (!params.exclude_lower, LOWERCASE),
        (!params.exclude_number, DIGITS),
        (params.include_special, SPECIAL),
    ]
    .into_iter()
    .filter_map(|(enabled, class)| enabled.then_some(class))
    .collect();
    let alphabet = classes.concat();

    let mut rng = rand::rng();
    let mut chars: Vec<u8> = classes
        .iter()
        .map(|class| class[rng.random_range(0..class.len())])
        .collect();
    while chars.len() < params.length {
        chars.push(alphabet[rng.random_range(0..alphabet.len())]);
    }
    chars.shuffle(&mut rng);

    Ok(chars.into_iter().map(char::from).collect())
}

/// Keeps a configured username; generates one when none was given.
pub fn generate_user(params: &UserGenerationParameters) -> Result<UserValue, GenerationError> {
    let username = match &params.username {
        Some(username) => username.clone(),
        None => generate_password(&StringGenerationParameters {
            length: GENERATED_USERNAME_LENGTH,
            exclude_number: true,
            ..Default::default()
        })?,
    };
    Ok(UserValue {
        username,
        password: generate_password(&params.password)?,
    })
}

pub fn generate_ssh(params: &SshGenerationParameters) -> SshValue {
    let key_pair = KeyPair::generate();
    let comment = params
        .ssh_comment
        .as_deref()
        .map(|comment| format!(" {comment}"))
        .unwrap_or_default();
    SshValue {
        public_key: format!("ssh-ed25519 {}{}", key_pair.public_key_hex(), comment),
        private_key: key_pair.private_key_hex(),
    }
}

/// Signing material of a certificate authority credential.
#[derive(Clone, Debug)]
pub struct CertificateAuthority {
    pub name: CredentialName,
    pub common_name: String,
    /// Encoded certificate of the authority
    pub certificate: String,
    key_pair: KeyPair,
}

impl CertificateAuthority {
    pub fn from_version(version: &CredentialVersion) -> Result<Self, GenerationError> {
        let CredentialValue::Certificate(value) = &version.value else {
            return Err(GenerationError::NotCertificateAuthority(version.name.clone()));
        };

        let certificate = SignedCertificate::decode(&value.certificate)?;
        if !certificate.body.is_ca {
            return Err(GenerationError::NotCertificateAuthority(version.name.clone()));
        }
        let key_pair = KeyPair::from_private_key_hex(&value.private_key)?;
        if key_pair.public_key_hex() != certificate.body.public_key {
            return Err(CryptoError::MalformedCertificate(format!(
                "private key of {} does not match its certificate",
                version.name
            ))
            .into());
        }

        Ok(Self {
            name: version.name.clone(),
            common_name: certificate.body.common_name,
            certificate: value.certificate.clone(),
            key_pair,
        })
    }
}

/// Issues a certificate with a fresh key. `signer` must be the resolved `params.ca`; a
/// certificate without one signs itself.
pub fn generate_certificate(
    params: &CertificateGenerationParameters,
    signer: Option<&CertificateAuthority>,
) -> Result<CertificateValue, GenerationError> {
    params.validate()?;
    if params.ca.is_some() && signer.is_none() {
        return Err(GenerationError::MissingSigner(params.common_name.clone()));
    }
    let signer = signer.filter(|_| !params.is_self_signed());

    let key_pair = KeyPair::generate();
    let issuer = signer
        .map(|ca| ca.common_name.clone())
        .unwrap_or_else(|| params.common_name.clone());
    let body = CertificateBody::new(
        params.common_name.clone(),
        issuer,
        key_pair.public_key_hex(),
        params.is_ca,
        Duration::days(i64::from(params.duration)),
    );
    let signing_key = signer.map(|ca| &ca.key_pair).unwrap_or(&key_pair);
    let certificate = SignedCertificate::issue(body, signing_key)?.encode()?;

    let ca = match signer {
        Some(ca) => ca.certificate.clone(),
        None => certificate.clone(),
    };
    Ok(CertificateValue {
        ca: Some(ca),
        ca_name: signer.map(|ca| ca.name.clone()),
        certificate,
        private_key: key_pair.private_key_hex(),
    })
}

/// Fresh credential material of the shape described by `params`
pub fn generate_value(
    params: &GenerationParameters,
    signer: Option<&CertificateAuthority>,
) -> Result<CredentialValue, GenerationError> {
    let value = match params {
        GenerationParameters::Password(params) => {
            CredentialValue::Password(generate_password(params)?)
        }
        GenerationParameters::User(params) => CredentialValue::User(generate_user(params)?),
        GenerationParameters::Certificate(params) => {
            CredentialValue::Certificate(generate_certificate(params, signer)?)
        }
        GenerationParameters::Ssh(params) => CredentialValue::Ssh(generate_ssh(params)),
    };
    Ok(value)
}

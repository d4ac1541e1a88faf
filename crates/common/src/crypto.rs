use chrono::{DateTime, Duration, SubsecRound, Utc};
use ed25519_dalek::{Signer, Verifier};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const CERTIFICATE_HEADER: &str = "-----BEGIN CERTIFICATE-----";
const CERTIFICATE_FOOTER: &str = "-----END CERTIFICATE-----";
const KEY_LENGTH: usize = 32;
const SIGNATURE_LENGTH: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Hex decoding error: {0}")]
    Encoding(#[from] hex::FromHexError),
    #[error("Key length error: expected {expected}, got {actual}")]
    KeyLength { expected: usize, actual: usize },
    #[error("Signature length error: expected {expected}, got {actual}")]
    SignatureLength { expected: usize, actual: usize },
    #[error("Signature error: {0}")]
    Signature(#[from] ed25519_dalek::SignatureError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Malformed certificate: {0}")]
    MalformedCertificate(String),
}

/// Ed25519 key material backing ssh keys and certificates.
#[derive(Clone, Debug)]
pub struct KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl KeyPair {
    pub fn generate() -> Self {
        let mut secret_key = [0u8; KEY_LENGTH];
        rand::rng().fill(&mut secret_key);
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(&secret_key),
        }
    }

    pub fn from_private_key_hex(private_key: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(private_key.trim())?;
        let secret_key: [u8; KEY_LENGTH] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| CryptoError::KeyLength {
                    expected: KEY_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(&secret_key),
        })
    }

    pub fn private_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> String {
        hex::encode(self.signing_key.sign(message).to_bytes())
    }
}

/// Verifies a hex encoded signature against a hex encoded public key
pub fn verify_signature(
    public_key: &str,
    message: &[u8],
    signature: &str,
) -> Result<(), CryptoError> {
    let key_bytes = hex::decode(public_key.trim())?;
    let key_bytes: [u8; KEY_LENGTH] =
        key_bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::KeyLength {
                expected: KEY_LENGTH,
                actual: key_bytes.len(),
            })?;
    let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(&key_bytes)?;

    let signature_bytes = hex::decode(signature)?;
    let signature_bytes: [u8; SIGNATURE_LENGTH] = signature_bytes.as_slice().try_into().map_err(
        |_| CryptoError::SignatureLength {
            expected: SIGNATURE_LENGTH,
            actual: signature_bytes.len(),
        },
    )?;
    let signature = ed25519_dalek::Signature::from_bytes(&signature_bytes);

    verifying_key
        .verify(message, &signature)
        .map_err(CryptoError::from)
}

/// The signed portion of a certificate.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CertificateBody {
    pub serial_number: Uuid,
    pub common_name: String,
    pub issuer: String,
    pub public_key: String,
    pub is_ca: bool,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

impl CertificateBody {
    pub fn new(
        common_name: String,
        issuer: String,
        public_key: String,
        is_ca: bool,
        lifetime: Duration,
    ) -> Self {
        let not_before = Utc::now().trunc_subsecs(0);
        Self {
            serial_number: Uuid::new_v4(),
            common_name,
            issuer,
            public_key,
            is_ca,
            not_before,
            not_after: not_before + lifetime,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SignedCertificate {
    pub body: CertificateBody,
    pub signature: String,
}

impl SignedCertificate {
    pub fn issue(body: CertificateBody, signer: &KeyPair) -> Result<Self, CryptoError> {
        let message = serde_json::to_vec(&body)?;
        let signature = signer.sign(&message);
        Ok(Self { body, signature })
    }

    pub fn verify(&self, issuer_public_key: &str) -> Result<(), CryptoError> {
        let message = serde_json::to_vec(&self.body)?;
        verify_signature(issuer_public_key, &message, &self.signature)
    }

    /// Armored text form stored in credential values
    pub fn encode(&self) -> Result<String, CryptoError> {
        let payload = hex::encode(serde_json::to_vec(self)?);
        Ok(format!("{CERTIFICATE_HEADER}\n{payload}\n{CERTIFICATE_FOOTER}\n"))
    }

    pub fn decode(encoded: &str) -> Result<Self, CryptoError> {
        let payload = encoded
            .trim()
            .strip_prefix(CERTIFICATE_HEADER)
            .and_then(|rest| rest.strip_suffix(CERTIFICATE_FOOTER))
            .ok_or_else(|| {
                CryptoError::MalformedCertificate("missing certificate armor".to_string())
            })?;
        let bytes = hex::decode(payload.trim())?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_pair_hex_round_trip_keeps_identity() {
        let key_pair = KeyPair::generate();
        let restored = KeyPair::from_private_key_hex(&key_pair.private_key_hex()).unwrap();
        assert_eq!(key_pair.public_key_hex(), restored.public_key_hex());
    }

    #[test]
    fn test_generated_key_pairs_differ() {
        let first = KeyPair::generate();
        let second = KeyPair::generate();
        assert_ne!(first.private_key_hex(), second.private_key_hex());
    }

    #[test]
    fn test_from_private_key_hex_rejects_wrong_length() {
        let result = KeyPair::from_private_key_hex("abcd");
        assert!(matches!(
            result,
            Err(CryptoError::KeyLength {
                expected: 32,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_issued_certificate_verifies_against_issuer_only() {
        let issuer = KeyPair::generate();
        let subject = KeyPair::generate();
        let body = CertificateBody::new(
            "leaf.example.com".to_string(),
            "example root".to_string(),
            subject.public_key_hex(),
            false,
            Duration::days(30),
        );
        let certificate = SignedCertificate::issue(body, &issuer).unwrap();

        assert!(certificate.verify(&issuer.public_key_hex()).is_ok());
        assert!(certificate.verify(&subject.public_key_hex()).is_err());
    }

    #[test]
    fn test_encoded_certificate_still_verifies() {
        let issuer = KeyPair::generate();
        let body = CertificateBody::new(
            "root".to_string(),
            "root".to_string(),
            issuer.public_key_hex(),
            true,
            Duration::days(365),
        );
        let certificate = SignedCertificate::issue(body, &issuer).unwrap();

        let encoded = certificate.encode().unwrap();
        assert!(encoded.starts_with(CERTIFICATE_HEADER));

        let decoded = SignedCertificate::decode(&encoded).unwrap();
        assert_eq!(decoded, certificate);
        assert_eq!(decoded.body.issuer, decoded.body.common_name);
        assert!(decoded.verify(&issuer.public_key_hex()).is_ok());
    }

    #[test]
    fn test_decode_rejects_unarmored_input() {
        let result = SignedCertificate::decode("not a certificate");
        assert!(matches!(result, Err(CryptoError::MalformedCertificate(_))));
    }

    #[test]
    fn test_tampered_certificate_fails_verification() {
        let issuer = KeyPair::generate();
        let body = CertificateBody::new(
            "leaf".to_string(),
            "root".to_string(),
            KeyPair::generate().public_key_hex(),
            false,
            Duration::days(1),
        );
        let mut certificate = SignedCertificate::issue(body, &issuer).unwrap();
        certificate.body.is_ca = true;

        assert!(certificate.verify(&issuer.public_key_hex()).is_err());
    }
}

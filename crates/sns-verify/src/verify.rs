//! Signature verification.
//!
//! # Verification Steps
//!
//! 1. `SignatureVersion` must be "1" (SHA1withRSA) or "2" (SHA256withRSA)
//! 2. `SigningCertURL` must match the SNS certificate URL allow-list
//! 3. Certificate PEM comes from the cache, or is fetched and cached
//! 4. The RSA public key is extracted from the certificate
//! 5. The canonical string is rebuilt from the signed fields
//! 6. The base64 `Signature` is checked with PKCS #1 v1.5 over that string

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use once_cell::sync::Lazy;
use regex::Regex;
use sha1::Sha1;
use rsa::sha2::{Digest, Sha256};
use rsa::Pkcs1v15Sign;
use tracing::debug;

use crate::cache::CertificateCache;
use crate::canonical::canonical_string;
use crate::client::Fetcher;
use crate::error::{fetch_failed, SnsError, SnsResult};
use crate::types::SnsPayload;
use crate::x509::{public_key_from_certificate_pem, RsaPublicKey};

/// Allow-list for `SigningCertURL`. This is the only trust anchor: the
/// certificate itself is not chain-validated.
pub const SIGNING_CERT_URL_PATTERN: &str = r"^https://sns\.[a-zA-Z0-9-]{3,}\.amazonaws\.com(\.cn)?/SimpleNotificationService-[a-zA-Z0-9]{32}\.pem$";

static SIGNING_CERT_URL: Lazy<Regex> = Lazy::new(|| Regex::new(SIGNING_CERT_URL_PATTERN).unwrap());

/// Whether `url` is an acceptable SNS signing certificate location.
pub fn is_valid_signing_cert_url(url: &str) -> bool {
    SIGNING_CERT_URL.is_match(url)
}

/// `SignatureVersion` field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureVersion {
    /// SHA-1 digest.
    V1,
    /// SHA-256 digest.
    V2,
}

impl SignatureVersion {
    pub fn parse(version: Option<&str>) -> SnsResult<Self> {
        match version {
            Some("1") => Ok(Self::V1),
            Some("2") => Ok(Self::V2),
            other => Err(SnsError::InvalidSignatureVersion {
                version: other.map(str::to_string),
            }),
        }
    }

    pub fn from_payload(payload: &SnsPayload) -> SnsResult<Self> {
        Self::parse(payload.signature_version.as_deref())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "1",
            Self::V2 => "2",
        }
    }
}

/// Verify `payload` against an already known key: version check, canonical
/// string, signature. The certificate URL is not consulted.
pub fn verify_with_key(payload: &SnsPayload, fields: &[&str], key: &RsaPublicKey) -> SnsResult<()> {
    let version = SignatureVersion::from_payload(payload)?;
    check_signature(version, payload, fields, key)
}

fn check_signature(
    version: SignatureVersion,
    payload: &SnsPayload,
    fields: &[&str],
    key: &RsaPublicKey,
) -> SnsResult<()> {
    let encoded = payload
        .signature
        .as_deref()
        .ok_or_else(|| SnsError::invalid_signature("signature missing"))?;

    // Base64 may arrive wrapped; whitespace carries no data
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let signature = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| SnsError::invalid_signature(format!("signature is not base64: {e}")))?;

    let rsa_key = key
        .to_rsa()
        .map_err(|e| SnsError::invalid_signature(format!("unusable public key: {e}")))?;

    let canonical = canonical_string(payload, fields);
    let message = canonical.as_bytes();

    let result = match version {
        SignatureVersion::V1 => rsa_key.verify(
            Pkcs1v15Sign::new::<Sha1>(),
            &Sha1::digest(message),
            &signature,
        ),
        SignatureVersion::V2 => rsa_key.verify(
            Pkcs1v15Sign::new::<Sha256>(),
            &Sha256::digest(message),
            &signature,
        ),
    };

    result.map_err(|_| SnsError::invalid_signature("signature does not match canonical string"))
}

/// Full verification pipeline with certificate retrieval.
#[derive(Clone)]
pub struct SignatureVerifier {
    cache: CertificateCache,
    fetcher: Arc<dyn Fetcher>,
}

impl SignatureVerifier {
    pub fn new(cache: CertificateCache, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { cache, fetcher }
    }

    pub fn cache(&self) -> &CertificateCache {
        &self.cache
    }

    /// Verify `payload`, whose signed fields are `fields` in order.
    pub async fn verify(&self, payload: &SnsPayload, fields: &[&str]) -> SnsResult<()> {
        let version = SignatureVersion::from_payload(payload)?;

        let url = payload
            .signing_cert_url
            .as_deref()
            .filter(|url| is_valid_signing_cert_url(url))
            .ok_or_else(|| SnsError::InvalidSigningCertUrl {
                url: payload.signing_cert_url.clone(),
            })?;

        let pem = self.certificate_pem(url).await?;
        let key = public_key_from_certificate_pem(&pem)?;

        check_signature(version, payload, fields, &key)?;
        debug!(url = %url, version = version.as_str(), "signature verified");
        Ok(())
    }

    /// Certificate PEM for `url`, from the cache or the network. Only
    /// successful downloads are cached.
    pub async fn certificate_pem(&self, url: &str) -> SnsResult<Arc<str>> {
        if let Some(pem) = self.cache.get(url) {
            return Ok(pem);
        }

        debug!(url = %url, "fetching signing certificate");
        let pem: Arc<str> = self
            .fetcher
            .get_text(url)
            .await
            .map_err(|e| fetch_failed(url, e))?
            .into();

        self.cache.insert(url, pem.clone());
        Ok(pem)
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_cert_url_allow_list() {
        let good = [
            "https://sns.us-east-1.amazonaws.com/SimpleNotificationService-f3ecfb7224c7233fe7bb5f59f96de52f.pem",
            "https://sns.cn-north-1.amazonaws.com.cn/SimpleNotificationService-3250158c6506d40628f1a3b6a9e7dc50.pem",
            "https://sns.us-gov-west-1.amazonaws.com/SimpleNotificationService-ABCDEF0123456789abcdef0123456789.pem",
        ];
        for url in good {
            assert!(is_valid_signing_cert_url(url), "{url}");
        }

        let bad = [
            // Plain HTTP
            "http://sns.us-east-1.amazonaws.com/SimpleNotificationService-f3ecfb7224c7233fe7bb5f59f96de52f.pem",
            // Foreign host
            "https://sns.us-east-1.evil.com/SimpleNotificationService-f3ecfb7224c7233fe7bb5f59f96de52f.pem",
            "https://sns.us-east-1.amazonaws.com.evil.com/SimpleNotificationService-f3ecfb7224c7233fe7bb5f59f96de52f.pem",
            // Region too short
            "https://sns.us.amazonaws.com/SimpleNotificationService-f3ecfb7224c7233fe7bb5f59f96de52f.pem",
            // Wrong id length
            "https://sns.us-east-1.amazonaws.com/SimpleNotificationService-f3ecfb.pem",
            // Extra path or suffix
            "https://sns.us-east-1.amazonaws.com/x/SimpleNotificationService-f3ecfb7224c7233fe7bb5f59f96de52f.pem",
            "https://sns.us-east-1.amazonaws.com/SimpleNotificationService-f3ecfb7224c7233fe7bb5f59f96de52f.pem?x=1",
            "",
        ];
        for url in bad {
            assert!(!is_valid_signing_cert_url(url), "{url}");
        }
    }

    #[test]
    fn test_signature_version_parse() {
        assert_eq!(SignatureVersion::parse(Some("1")).unwrap(), SignatureVersion::V1);
        assert_eq!(SignatureVersion::parse(Some("2")).unwrap(), SignatureVersion::V2);

        for bad in [Some("3"), Some(""), Some(" 1"), None] {
            let err = SignatureVersion::parse(bad).unwrap_err();
            assert_eq!(err.to_string(), "Invalid SignatureVersion");
        }
    }

    #[test]
    fn test_missing_signature_is_invalid() {
        let payload = SnsPayload {
            signature_version: Some("1".to_string()),
            ..SnsPayload::default()
        };
        let key = RsaPublicKey::from_be_bytes(&[0xC5; 128], &[0x01, 0x00, 0x01]);
        let err = verify_with_key(&payload, &["Message"], &key).unwrap_err();
        assert!(matches!(err, SnsError::InvalidSignature { .. }));
    }

    #[test]
    fn test_non_base64_signature_is_invalid() {
        let payload = SnsPayload {
            signature_version: Some("2".to_string()),
            signature: Some("%%%".to_string()),
            ..SnsPayload::default()
        };
        let key = RsaPublicKey::from_be_bytes(&[0xC5; 128], &[0x01, 0x00, 0x01]);
        let err = verify_with_key(&payload, &["Message"], &key).unwrap_err();
        assert_eq!(err.to_string(), "Invalid Signature");
    }

    #[test]
    fn test_unusable_key_is_invalid_signature() {
        let payload = SnsPayload {
            signature_version: Some("1".to_string()),
            signature: Some("AAAA".to_string()),
            ..SnsPayload::default()
        };
        // Exponent 1 is refused by the rsa crate
        let key = RsaPublicKey::from_be_bytes(&[0xC5; 128], &[0x01]);
        let err = verify_with_key(&payload, &["Message"], &key).unwrap_err();
        assert!(matches!(err, SnsError::InvalidSignature { .. }));
    }

    #[test]
    fn test_sha1_and_sha256_signatures_verify() {
        let private = rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap();
        let key = RsaPublicKey::from(&private.to_public_key());
        let fields = ["Message", "Type"];

        for (version, other) in [("1", "2"), ("2", "1")] {
            let mut payload = SnsPayload {
                message_type: Some("Notification".to_string()),
                message: Some("hello".to_string()),
                signature_version: Some(version.to_string()),
                ..SnsPayload::default()
            };
            let canonical = canonical_string(&payload, &fields);
            let signature = match version {
                "1" => private.sign(Pkcs1v15Sign::new::<Sha1>(), &Sha1::digest(canonical.as_bytes())),
                _ => private.sign(
                    Pkcs1v15Sign::new::<Sha256>(),
                    &Sha256::digest(canonical.as_bytes()),
                ),
            }
            .unwrap();
            payload.signature = Some(BASE64.encode(signature));

            assert!(verify_with_key(&payload, &fields, &key).is_ok(), "version {version}");

            payload.signature_version = Some(other.to_string());
            let err = verify_with_key(&payload, &fields, &key).unwrap_err();
            assert_eq!(err.to_string(), "Invalid Signature");
        }
    }
}

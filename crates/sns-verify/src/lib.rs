//! Signature verification for Amazon SNS HTTP(S) webhook deliveries.
//!
//! This crate checks that an inbound SNS message was signed by AWS before
//! it is trusted, providing:
//!
//! - A small ASN.1 DER engine with template-driven structural matching
//! - A PEM codec
//! - RSA public key extraction from X.509 certificates
//! - Canonical signed-string construction per message type
//! - An LRU cache of signing certificates
//! - PKCS #1 v1.5 verification (SHA-1 for version "1", SHA-256 for "2")
//! - Automatic subscription confirmation
//!
//! # Quick Start
//!
//! ```no_run
//! use sns_verify::{RawRequest, Validator, ValidatorConfig};
//!
//! # async fn example(body: String) -> Result<(), sns_verify::SnsError> {
//! let validator = Validator::new(ValidatorConfig::default())?;
//!
//! let payload = validator.validate(&RawRequest::post(body)).await?;
//! println!("verified {:?} from {:?}", payload.message_type, payload.topic_arn);
//! # Ok(())
//! # }
//! ```
//!
//! # Trust model
//!
//! `SigningCertURL` must match the SNS certificate URL pattern
//! ([`verify::SIGNING_CERT_URL_PATTERN`]). The certificate served there is
//! not chain-validated.
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `SNS_VERIFY_USE_CACHE` | Cache signing certificates (default: true) |
//! | `SNS_VERIFY_MAX_CERTS` | Certificate cache capacity (default: 1000) |
//! | `SNS_VERIFY_AUTO_SUBSCRIBE` | Confirm subscriptions (default: true) |
//! | `SNS_VERIFY_AUTO_RESUBSCRIBE` | Re-subscribe on unsubscribe confirmations (default: true) |
//! | `SNS_VERIFY_TIMEOUT` | HTTP timeout in seconds (default: 30) |

pub mod asn1;
pub mod bytes;
pub mod cache;
pub mod canonical;
pub mod client;
pub mod config;
pub mod error;
pub mod pem;
pub mod types;
pub mod validator;
pub mod verify;
pub mod x509;

// Re-export main types
pub use cache::CertificateCache;
pub use canonical::{canonical_string, signed_fields, MessageType};
pub use client::{FetchError, Fetcher, HttpFetcher, USER_AGENT};
pub use config::ValidatorConfig;
pub use error::{SnsError, SnsResult};
pub use types::SnsPayload;
pub use validator::{BodyError, InboundRequest, RawRequest, Validator};
pub use verify::{is_valid_signing_cert_url, verify_with_key, SignatureVerifier, SignatureVersion};
pub use x509::{
    public_key_from_certificate_pem, public_key_pem_from_certificate_pem, public_key_to_pem,
    RsaPublicKey,
};

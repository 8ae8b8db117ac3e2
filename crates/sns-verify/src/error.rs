//! Error types for payload validation.
//!
//! Every variant renders a fixed message. Detail fields are kept for
//! diagnostics and logging but never change the `Display` output, so callers
//! can match on the message text across releases.

use crate::asn1::Asn1Error;
use crate::client::FetchError;
use crate::pem::PemError;

/// Validation faults. All are fatal to the current call.
#[derive(Debug, thiserror::Error)]
pub enum SnsError {
    /// Request method was not POST.
    #[error("Method must be POST")]
    InvalidMethod { method: String },

    /// Body could not be read or decoded as a payload object.
    #[error("Invalid JSON")]
    InvalidJson { reason: String },

    /// `Type` is missing or not a known message type.
    #[error("Invalid Type")]
    UnsupportedType { message_type: Option<String> },

    /// `SignatureVersion` is not "1" or "2".
    #[error("Invalid SignatureVersion")]
    InvalidSignatureVersion { version: Option<String> },

    /// `SigningCertURL` is not on the allow-list.
    #[error("Invalid SigningCertURL")]
    InvalidSigningCertUrl { url: Option<String> },

    /// Certificate download failed or returned a non-success status.
    #[error("Failed to fetch certificate")]
    CertificateFetchFailed { url: String, reason: String },

    /// No PEM block could be found or decoded.
    #[error("Invalid PEM formatted message.")]
    MalformedPem { reason: String },

    /// The first PEM block is not a certificate.
    #[error("Unsupported PEM type")]
    UnsupportedPemType { label: String },

    /// SubjectPublicKeyInfo carries a non-RSA algorithm.
    #[error("Unsupported key algorithm")]
    UnsupportedKeyAlgorithm { oid: String },

    /// Certificate DER did not parse or did not match the X.509 shape.
    #[error("Invalid certificate structure")]
    MalformedCertificate { reason: String },

    /// Signature missing, undecodable, or cryptographically invalid.
    #[error("Invalid Signature")]
    InvalidSignature { reason: String },

    /// Construction-time configuration error.
    #[error("{message}")]
    InvalidConfiguration { message: String },
}

impl SnsError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Request shape
            Self::InvalidMethod { .. } => 1,
            Self::InvalidJson { .. } => 1,
            Self::UnsupportedType { .. } => 1,

            // Trust failures
            Self::InvalidSignatureVersion { .. } => 4,
            Self::InvalidSigningCertUrl { .. } => 4,
            Self::InvalidSignature { .. } => 4,

            // Certificate material
            Self::MalformedPem { .. } => 3,
            Self::UnsupportedPemType { .. } => 3,
            Self::UnsupportedKeyAlgorithm { .. } => 3,
            Self::MalformedCertificate { .. } => 3,

            // Network
            Self::CertificateFetchFailed { .. } => 5,

            Self::InvalidConfiguration { .. } => 2,
        }
    }

    /// Whether the fault was caused by the sender's payload rather than by
    /// certificate retrieval or local configuration.
    pub fn is_payload_error(&self) -> bool {
        !matches!(
            self,
            Self::CertificateFetchFailed { .. } | Self::InvalidConfiguration { .. }
        )
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_signature(reason: impl Into<String>) -> Self {
        Self::InvalidSignature {
            reason: reason.into(),
        }
    }
}

impl From<Asn1Error> for SnsError {
    fn from(err: Asn1Error) -> Self {
        Self::MalformedCertificate {
            reason: err.to_string(),
        }
    }
}

impl From<PemError> for SnsError {
    fn from(err: PemError) -> Self {
        Self::MalformedPem {
            reason: err.to_string(),
        }
    }
}

/// Result type for validation operations.
pub type SnsResult<T> = Result<T, SnsError>;

pub(crate) fn fetch_failed(url: &str, err: FetchError) -> SnsError {
    SnsError::CertificateFetchFailed {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

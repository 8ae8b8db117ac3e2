//! RSA public key extraction from X.509 certificates.
//!
//! Only the shape of the certificate is checked. Chain of trust, validity
//! period and extensions are not evaluated; the signing certificate URL
//! allow-list is the trust anchor.

use crate::asn1::{self, der_to_oid, tag, Asn1Node, Asn1Value, Captures, Template};
use crate::error::{SnsError, SnsResult};
use crate::pem::{self, PemBlock, PemError};

/// rsaEncryption (PKCS #1).
pub const RSA_ENCRYPTION_OID: &str = "1.2.840.113549.1.1.1";

const RSA_ENCRYPTION_DER: [u8; 9] = [0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01];

/// PEM labels accepted as a certificate.
pub const CERTIFICATE_LABELS: &[&str] = &["CERTIFICATE", "X509 CERTIFICATE", "TRUSTED CERTIFICATE"];

pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

// Certificate ::= SEQUENCE { tbsCertificate, signatureAlgorithm, signatureValue }

static VERSION: &[Template] =
    &[Template::universal("Certificate.TBSCertificate.version.integer", tag::INTEGER, false)
        .capturing("certVersion")];

static SIGNATURE_ALGORITHM: &[Template] = &[
    Template::universal("Certificate.TBSCertificate.signature.algorithm", tag::OID, false)
        .capturing("certinfoSignatureOid"),
    Template::any("Certificate.TBSCertificate.signature.parameters")
        .optional()
        .capturing_node("certinfoSignatureParams"),
];

static VALIDITY: &[Template] = &[
    Template::universal("Certificate.TBSCertificate.validity.notBefore (utc)", tag::UTC_TIME, false)
        .optional()
        .capturing("certValidity1UTCTime"),
    Template::universal(
        "Certificate.TBSCertificate.validity.notBefore (generalized)",
        tag::GENERALIZED_TIME,
        false,
    )
    .optional()
    .capturing("certValidity2GeneralizedTime"),
    Template::universal("Certificate.TBSCertificate.validity.notAfter (utc)", tag::UTC_TIME, false)
        .optional()
        .capturing("certValidity3UTCTime"),
    Template::universal(
        "Certificate.TBSCertificate.validity.notAfter (generalized)",
        tag::GENERALIZED_TIME,
        false,
    )
    .optional()
    .capturing("certValidity4GeneralizedTime"),
];

static ISSUER_UNIQUE_ID: &[Template] = &[Template::universal(
    "Certificate.TBSCertificate.issuerUniqueID.id",
    tag::BIT_STRING,
    false,
)
.capturing_bit_string("certIssuerUniqueId")];

static SUBJECT_UNIQUE_ID: &[Template] = &[Template::universal(
    "Certificate.TBSCertificate.subjectUniqueID.id",
    tag::BIT_STRING,
    false,
)
.capturing_bit_string("certSubjectUniqueId")];

static TBS_CERTIFICATE: &[Template] = &[
    Template::context("Certificate.TBSCertificate.version", 0, true)
        .optional()
        .with_children(VERSION),
    Template::universal("Certificate.TBSCertificate.serialNumber", tag::INTEGER, false)
        .capturing("certSerialNumber"),
    Template::universal("Certificate.TBSCertificate.signature", tag::SEQUENCE, true)
        .with_children(SIGNATURE_ALGORITHM),
    Template::universal("Certificate.TBSCertificate.issuer", tag::SEQUENCE, true)
        .capturing_node("certIssuer"),
    Template::universal("Certificate.TBSCertificate.validity", tag::SEQUENCE, true)
        .with_children(VALIDITY),
    Template::universal("Certificate.TBSCertificate.subject", tag::SEQUENCE, true)
        .capturing_node("certSubject"),
    Template::universal(
        "Certificate.TBSCertificate.subjectPublicKeyInfo",
        tag::SEQUENCE,
        true,
    )
    .capturing_node("subjectPublicKeyInfo"),
    Template::context("Certificate.TBSCertificate.issuerUniqueID", 1, true)
        .optional()
        .with_children(ISSUER_UNIQUE_ID),
    Template::context("Certificate.TBSCertificate.subjectUniqueID", 2, true)
        .optional()
        .with_children(SUBJECT_UNIQUE_ID),
    Template::context("Certificate.TBSCertificate.extensions", 3, true)
        .optional()
        .capturing("certExtensions"),
];

static CERTIFICATE_SIGNATURE_ALGORITHM: &[Template] = &[
    Template::universal("Certificate.signatureAlgorithm.algorithm", tag::OID, false)
        .capturing("certSignatureOid"),
    Template::any("Certificate.signatureAlgorithm.parameters")
        .optional()
        .capturing_node("certSignatureParams"),
];

static CERTIFICATE_CHILDREN: &[Template] = &[
    Template::universal("Certificate.TBSCertificate", tag::SEQUENCE, true)
        .capturing_node("tbsCertificate")
        .with_children(TBS_CERTIFICATE),
    Template::universal("Certificate.signatureAlgorithm", tag::SEQUENCE, true)
        .with_children(CERTIFICATE_SIGNATURE_ALGORITHM),
    Template::universal("Certificate.signatureValue", tag::BIT_STRING, false)
        .capturing_bit_string("certSignature"),
];

/// X.509 certificate shape.
pub static CERTIFICATE: Template =
    Template::universal("Certificate", tag::SEQUENCE, true).with_children(CERTIFICATE_CHILDREN);

// SubjectPublicKeyInfo ::= SEQUENCE { algorithm AlgorithmIdentifier, subjectPublicKey BIT STRING }

static SPKI_ALGORITHM: &[Template] = &[Template::universal(
    "AlgorithmIdentifier.algorithm",
    tag::OID,
    false,
)
.capturing("publicKeyOid")];

static SPKI_PUBLIC_KEY: &[Template] = &[Template::universal(
    "SubjectPublicKeyInfo.subjectPublicKey.RSAPublicKey",
    tag::SEQUENCE,
    true,
)
.optional()
.capturing_node("rsaPublicKey")];

static SPKI_CHILDREN: &[Template] = &[
    Template::universal("SubjectPublicKeyInfo.AlgorithmIdentifier", tag::SEQUENCE, true)
        .with_children(SPKI_ALGORITHM),
    Template::universal("SubjectPublicKeyInfo.subjectPublicKey", tag::BIT_STRING, false)
        .with_children(SPKI_PUBLIC_KEY),
];

/// SubjectPublicKeyInfo shape.
pub static SUBJECT_PUBLIC_KEY_INFO: Template =
    Template::universal("SubjectPublicKeyInfo", tag::SEQUENCE, true)
        .capturing_node("subjectPublicKeyInfo")
        .with_children(SPKI_CHILDREN);

// RSAPublicKey ::= SEQUENCE { modulus INTEGER, publicExponent INTEGER }

static RSA_PUBLIC_KEY_CHILDREN: &[Template] = &[
    Template::universal("RSAPublicKey.modulus", tag::INTEGER, false).capturing("publicKeyModulus"),
    Template::universal("RSAPublicKey.exponent", tag::INTEGER, false)
        .capturing("publicKeyExponent"),
];

/// PKCS #1 RSAPublicKey shape.
pub static RSA_PUBLIC_KEY: Template =
    Template::universal("RSAPublicKey", tag::SEQUENCE, true).with_children(RSA_PUBLIC_KEY_CHILDREN);

/// RSA public key as unsigned big-endian magnitudes.
///
/// Both parts are kept without redundant leading zeros, so keys compare
/// equal regardless of how their INTEGERs were padded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RsaPublicKey {
    modulus: Vec<u8>,
    exponent: Vec<u8>,
}

impl RsaPublicKey {
    pub fn from_be_bytes(modulus: &[u8], exponent: &[u8]) -> Self {
        Self {
            modulus: asn1::strip_leading_zeros(modulus).to_vec(),
            exponent: asn1::strip_leading_zeros(exponent).to_vec(),
        }
    }

    /// Parse hex magnitudes. Odd-length input is read as if zero-padded.
    pub fn from_hex(modulus: &str, exponent: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self::from_be_bytes(&decode_hex(modulus)?, &decode_hex(exponent)?))
    }

    pub fn modulus(&self) -> &[u8] {
        &self.modulus
    }

    pub fn exponent(&self) -> &[u8] {
        &self.exponent
    }

    pub fn modulus_hex(&self) -> String {
        hex::encode(&self.modulus)
    }

    pub fn exponent_hex(&self) -> String {
        hex::encode(&self.exponent)
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        match self.modulus.first() {
            Some(&top) if top != 0 => self.modulus.len() * 8 - top.leading_zeros() as usize,
            _ => 0,
        }
    }

    /// Convert for use with the `rsa` crate. Fails for keys it will not use
    /// (exponent too small or too large, modulus out of range).
    pub fn to_rsa(&self) -> Result<rsa::RsaPublicKey, rsa::Error> {
        rsa::RsaPublicKey::new(
            rsa::BigUint::from_bytes_be(&self.modulus),
            rsa::BigUint::from_bytes_be(&self.exponent),
        )
    }
}

impl From<&rsa::RsaPublicKey> for RsaPublicKey {
    fn from(key: &rsa::RsaPublicKey) -> Self {
        use rsa::traits::PublicKeyParts;
        Self::from_be_bytes(&key.n().to_bytes_be(), &key.e().to_bytes_be())
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    if s.len() % 2 == 1 {
        hex::decode(format!("0{s}"))
    } else {
        hex::decode(s)
    }
}

/// Extract the RSA public key from the first PEM block of `pem_text`.
pub fn public_key_from_certificate_pem(pem_text: &str) -> SnsResult<RsaPublicKey> {
    let block = first_block(pem_text)?;

    if !CERTIFICATE_LABELS.contains(&block.label.as_str()) {
        return Err(SnsError::UnsupportedPemType { label: block.label });
    }
    if block.is_encrypted() {
        return Err(PemError::Encrypted { label: block.label }.into());
    }

    let node = asn1::decode(&block.body)?;
    public_key_from_certificate(&node)
}

/// Extract the RSA public key from a decoded certificate.
pub fn public_key_from_certificate(certificate: &Asn1Node) -> SnsResult<RsaPublicKey> {
    let mut captures = Captures::new();
    let mut errors = Vec::new();

    if !asn1::validate(certificate, &CERTIFICATE, &mut captures, Some(&mut errors)) {
        return Err(malformed(errors));
    }

    let spki = captures
        .node("subjectPublicKeyInfo")
        .ok_or_else(|| malformed(vec!["subjectPublicKeyInfo not captured".to_string()]))?;
    public_key_from_spki(spki)
}

/// Extract the RSA public key from a SubjectPublicKeyInfo node.
pub fn public_key_from_spki(spki: &Asn1Node) -> SnsResult<RsaPublicKey> {
    let mut captures = Captures::new();
    let mut errors = Vec::new();

    if !asn1::validate(spki, &SUBJECT_PUBLIC_KEY_INFO, &mut captures, Some(&mut errors)) {
        return Err(malformed(errors));
    }

    let oid_bytes = captures
        .bytes("publicKeyOid")
        .ok_or_else(|| malformed(vec!["public key algorithm not captured".to_string()]))?;
    let oid = der_to_oid(oid_bytes)?;
    if oid != RSA_ENCRYPTION_OID {
        return Err(SnsError::UnsupportedKeyAlgorithm { oid });
    }

    let rsa_key = captures
        .node("rsaPublicKey")
        .ok_or_else(|| malformed(vec!["subjectPublicKey does not hold an RSAPublicKey".to_string()]))?;

    let mut key_captures = Captures::new();
    let mut errors = Vec::new();
    if !asn1::validate(rsa_key, &RSA_PUBLIC_KEY, &mut key_captures, Some(&mut errors)) {
        return Err(malformed(errors));
    }

    match (
        key_captures.bytes("publicKeyModulus"),
        key_captures.bytes("publicKeyExponent"),
    ) {
        (Some(n), Some(e)) => Ok(RsaPublicKey::from_be_bytes(n, e)),
        _ => Err(malformed(vec!["RSA key parts not captured".to_string()])),
    }
}

/// Build the SubjectPublicKeyInfo for `key`.
pub fn public_key_to_spki(key: &RsaPublicKey) -> Asn1Node {
    let algorithm = Asn1Node::sequence(vec![
        Asn1Node::universal(
            tag::OID,
            false,
            Asn1Value::Primitive(RSA_ENCRYPTION_DER.to_vec()),
        ),
        Asn1Node::null(),
    ]);
    let rsa_key = Asn1Node::sequence(vec![
        Asn1Node::unsigned_integer(&key.modulus),
        Asn1Node::unsigned_integer(&key.exponent),
    ]);

    Asn1Node::sequence(vec![algorithm, Asn1Node::bit_string_wrapping(rsa_key)])
}

/// Serialize `key` as a "PUBLIC KEY" PEM.
pub fn public_key_to_pem(key: &RsaPublicKey) -> String {
    let der = asn1::encode(&public_key_to_spki(key));
    pem::encode(&PemBlock::new(PUBLIC_KEY_LABEL, der))
}

/// Certificate PEM in, "PUBLIC KEY" PEM out.
pub fn public_key_pem_from_certificate_pem(pem_text: &str) -> SnsResult<String> {
    let key = public_key_from_certificate_pem(pem_text)?;
    Ok(public_key_to_pem(&key))
}

/// Parse a "PUBLIC KEY" PEM back into a key.
pub fn public_key_from_pem(pem_text: &str) -> SnsResult<RsaPublicKey> {
    let block = first_block(pem_text)?;
    if block.label != PUBLIC_KEY_LABEL {
        return Err(SnsError::UnsupportedPemType { label: block.label });
    }
    public_key_from_spki(&asn1::decode(&block.body)?)
}

fn first_block(pem_text: &str) -> SnsResult<PemBlock> {
    pem::decode(pem_text)?
        .into_iter()
        .next()
        .ok_or_else(|| PemError::NoBlocks.into())
}

fn malformed(errors: Vec<String>) -> SnsError {
    SnsError::MalformedCertificate {
        reason: errors.join("; "),
    }
}

//! Shared fixtures: a signing key, a certificate wrapping it, signed
//! payloads and an in-memory [`Fetcher`].

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use async_trait::async_trait;
use sha1::Sha1;
use rsa::sha2::{Digest, Sha256};
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use serde_json::json;
use sns_verify::asn1::{self, tag, Asn1Node, Asn1Value};
use sns_verify::pem::{self, PemBlock};
use sns_verify::x509::public_key_to_spki;
use sns_verify::{canonical_string, signed_fields, FetchError, Fetcher, RsaPublicKey, SnsPayload};

pub const CERT_URL: &str =
    "https://sns.us-east-1.amazonaws.com/SimpleNotificationService-0123456789abcdef0123456789abcdef.pem";

pub const SUBSCRIBE_URL: &str =
    "https://sns.us-east-1.amazonaws.com/?Action=ConfirmSubscription&TopicArn=arn:aws:sns:us-east-1:123456789012:orders&Token=2336412f37";

pub fn cert_url(n: usize) -> String {
    format!("https://sns.eu-west-1.amazonaws.com/SimpleNotificationService-{n:032}.pem")
}

/// Process-wide 1024-bit key; generation is slow in debug builds.
pub fn signing_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        RsaPrivateKey::new(&mut rand::thread_rng(), 1024).expect("failed to generate RSA key")
    })
}

pub fn public_key() -> RsaPublicKey {
    RsaPublicKey::from(&signing_key().to_public_key())
}

fn text(tag_number: u8, s: &str) -> Asn1Node {
    Asn1Node::universal(tag_number, false, Asn1Value::Primitive(s.as_bytes().to_vec()))
}

fn name(common_name: &str) -> Asn1Node {
    let attribute = Asn1Node::sequence(vec![
        Asn1Node::oid("2.5.4.3").unwrap(),
        text(tag::PRINTABLE_STRING, common_name),
    ]);
    Asn1Node::sequence(vec![Asn1Node::universal(
        tag::SET,
        true,
        Asn1Value::Composed(vec![attribute]),
    )])
}

/// DER certificate carrying `key`. The outer signature is filler; nothing
/// checks the chain.
pub fn certificate_der(key: &RsaPublicKey) -> Vec<u8> {
    let sig_alg = Asn1Node::sequence(vec![
        Asn1Node::oid("1.2.840.113549.1.1.11").unwrap(),
        Asn1Node::null(),
    ]);
    let validity = Asn1Node::sequence(vec![
        text(tag::UTC_TIME, "250101000000Z"),
        text(tag::UTC_TIME, "350101000000Z"),
    ]);
    let extensions = Asn1Node::explicit(
        3,
        Asn1Node::sequence(vec![Asn1Node::sequence(vec![
            Asn1Node::oid("2.5.29.19").unwrap(),
            Asn1Node::universal(tag::OCTET_STRING, false, Asn1Value::Primitive(vec![0x30, 0x00])),
        ])]),
    );

    let tbs = Asn1Node::sequence(vec![
        Asn1Node::explicit(0, Asn1Node::unsigned_integer(&[2])),
        Asn1Node::unsigned_integer(&[0x5A, 0x17, 0x00, 0xFF]),
        sig_alg.clone(),
        name("Test Root"),
        validity,
        name("sns.amazonaws.com"),
        public_key_to_spki(key),
        extensions,
    ]);

    let certificate = Asn1Node::sequence(vec![
        tbs,
        sig_alg,
        Asn1Node::universal(
            tag::BIT_STRING,
            false,
            Asn1Value::Primitive(vec![0x00, 0xDE, 0xAD, 0xBE, 0xEF]),
        ),
    ]);
    asn1::encode(&certificate)
}

pub fn certificate_pem(key: &RsaPublicKey) -> String {
    pem::encode(&PemBlock::new("CERTIFICATE", certificate_der(key)))
}

/// PEM for the fixture signing key.
pub fn signing_certificate_pem() -> String {
    certificate_pem(&public_key())
}

/// Sign `payload` in place over its canonical string.
pub fn sign(payload: &mut SnsPayload) {
    let fields = signed_fields(payload.message_type.as_deref()).expect("known message type");
    let canonical = canonical_string(payload, fields);
    let key = signing_key();

    let signature = match payload.signature_version.as_deref() {
        Some("2") => key.sign(
            Pkcs1v15Sign::new::<Sha256>(),
            &Sha256::digest(canonical.as_bytes()),
        ),
        _ => key.sign(Pkcs1v15Sign::new::<Sha1>(), &Sha1::digest(canonical.as_bytes())),
    }
    .expect("signing failed");

    payload.signature = Some(base64_encode(&signature));
}

fn base64_encode(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn notification() -> SnsPayload {
    SnsPayload::from_value(json!({
        "Type": "Notification",
        "MessageId": "da41e39f-ea4d-435a-b922-c6aae3915ebe",
        "TopicArn": "arn:aws:sns:us-east-1:123456789012:orders",
        "Subject": "Order shipped",
        "Message": "{\"orderId\":\"A-1001\",\"status\":\"shipped\"}",
        "Timestamp": "2026-03-14T09:26:53.589Z",
        "SignatureVersion": "1",
        "SigningCertURL": CERT_URL,
        "UnsubscribeURL": "https://sns.us-east-1.amazonaws.com/?Action=Unsubscribe&SubscriptionArn=arn:aws:sns:us-east-1:123456789012:orders:2bcfbf39"
    }))
    .unwrap()
}

fn confirmation(message_type: &str) -> SnsPayload {
    SnsPayload::from_value(json!({
        "Type": message_type,
        "MessageId": "165545c9-2a5c-472c-8df2-7ff2be2b3b1b",
        "Token": "2336412f37",
        "TopicArn": "arn:aws:sns:us-east-1:123456789012:orders",
        "Message": "You have chosen to subscribe to the topic arn:aws:sns:us-east-1:123456789012:orders.",
        "SubscribeURL": SUBSCRIBE_URL,
        "Timestamp": "2026-03-14T09:20:01.101Z",
        "SignatureVersion": "1",
        "SigningCertURL": CERT_URL
    }))
    .unwrap()
}

pub fn subscription_confirmation() -> SnsPayload {
    confirmation("SubscriptionConfirmation")
}

pub fn unsubscribe_confirmation() -> SnsPayload {
    confirmation("UnsubscribeConfirmation")
}

pub fn signed(mut payload: SnsPayload) -> SnsPayload {
    sign(&mut payload);
    payload
}

pub fn body(payload: &SnsPayload) -> String {
    serde_json::to_string(payload).unwrap()
}

/// In-memory [`Fetcher`]. Unknown URLs answer 404.
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, Result<String, FetchError>>>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher serving the fixture certificate at [`CERT_URL`].
    pub fn with_certificate() -> Self {
        let fetcher = Self::new();
        fetcher.respond(CERT_URL, signing_certificate_pem());
        fetcher
    }

    pub fn respond(&self, url: impl Into<String>, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.into(), Ok(body.into()));
    }

    pub fn fail(&self, url: impl Into<String>, error: FetchError) {
        self.responses.lock().unwrap().insert(url.into(), Err(error));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::Status { status: 404 }))
    }
}

//! Contract tests for the `snsv` binary.
//!
//! Cover output and exit codes for canonical, extract-key, dump, and the
//! verify rejections that happen before any network access.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

use serde_json::json;
use sns_verify::asn1::{self, tag, Asn1Node, Asn1Value};
use sns_verify::pem::{self, PemBlock};
use sns_verify::x509::public_key_to_spki;
use sns_verify::{public_key_to_pem, RsaPublicKey};
use tempfile::TempDir;

const CERT_URL: &str =
    "https://sns.us-east-1.amazonaws.com/SimpleNotificationService-0123456789abcdef0123456789abcdef.pem";

fn snsv() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_snsv"));
    for var in [
        "SNS_VERIFY_USE_CACHE",
        "SNS_VERIFY_MAX_CERTS",
        "SNS_VERIFY_AUTO_SUBSCRIBE",
        "SNS_VERIFY_AUTO_RESUBSCRIBE",
        "SNS_VERIFY_TIMEOUT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn write(dir: &TempDir, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn notification() -> serde_json::Value {
    json!({
        "Type": "Notification",
        "MessageId": "da41e39f-ea4d-435a-b922-c6aae3915ebe",
        "TopicArn": "arn:aws:sns:us-east-1:123456789012:orders",
        "Subject": "Order shipped",
        "Message": "hello",
        "Timestamp": "2026-03-14T09:26:53.589Z",
        "SignatureVersion": "1",
        "Signature": "AAAA",
        "SigningCertURL": CERT_URL
    })
}

fn sample_key() -> RsaPublicKey {
    let mut modulus = vec![0xB7; 64];
    modulus[63] = 0x35;
    RsaPublicKey::from_be_bytes(&modulus, &[0x01, 0x00, 0x01])
}

fn certificate_pem(key: &RsaPublicKey) -> String {
    let sig_alg = Asn1Node::sequence(vec![
        Asn1Node::oid("1.2.840.113549.1.1.11").unwrap(),
        Asn1Node::null(),
    ]);
    let name = Asn1Node::sequence(Vec::new());
    let validity = Asn1Node::sequence(vec![
        Asn1Node::universal(tag::UTC_TIME, false, Asn1Value::Primitive(b"250101000000Z".to_vec())),
        Asn1Node::universal(tag::UTC_TIME, false, Asn1Value::Primitive(b"350101000000Z".to_vec())),
    ]);
    let tbs = Asn1Node::sequence(vec![
        Asn1Node::explicit(0, Asn1Node::unsigned_integer(&[2])),
        Asn1Node::unsigned_integer(&[7]),
        sig_alg.clone(),
        name.clone(),
        validity,
        name,
        public_key_to_spki(key),
    ]);
    let cert = Asn1Node::sequence(vec![
        tbs,
        sig_alg,
        Asn1Node::universal(tag::BIT_STRING, false, Asn1Value::Primitive(vec![0x00, 0x01])),
    ]);
    pem::encode(&PemBlock::new("CERTIFICATE", asn1::encode(&cert)))
}

#[test]
fn canonical_prints_signed_string() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "payload.json", notification().to_string());

    snsv()
        .arg("canonical")
        .arg(&input)
        .assert()
        .success()
        .stdout(
            "Message\nhello\n\
             MessageId\nda41e39f-ea4d-435a-b922-c6aae3915ebe\n\
             Subject\nOrder shipped\n\
             Timestamp\n2026-03-14T09:26:53.589Z\n\
             TopicArn\narn:aws:sns:us-east-1:123456789012:orders\n\
             Type\nNotification\n",
        );
}

#[test]
fn canonical_reads_stdin() {
    snsv()
        .args(["canonical", "-"])
        .write_stdin(notification().to_string())
        .assert()
        .success()
        .stdout(predicate::str::ends_with("Type\nNotification\n"));
}

#[test]
fn canonical_rejects_unknown_type() {
    let dir = TempDir::new().unwrap();
    let mut payload = notification();
    payload["Type"] = json!("Bogus");
    let input = write(&dir, "payload.json", payload.to_string());

    snsv()
        .arg("canonical")
        .arg(&input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid Type"));
}

#[test]
fn verify_rejects_bad_json() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "payload.json", "{not json");

    snsv()
        .arg("verify")
        .arg(&input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid JSON"));
}

#[test]
fn verify_rejects_signature_version() {
    let dir = TempDir::new().unwrap();
    let mut payload = notification();
    payload["SignatureVersion"] = json!("3");
    let input = write(&dir, "payload.json", payload.to_string());

    snsv()
        .arg("verify")
        .arg(&input)
        .assert()
        .code(4)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Invalid SignatureVersion"));
}

#[test]
fn verify_rejects_foreign_cert_url() {
    let dir = TempDir::new().unwrap();
    let mut payload = notification();
    payload["SigningCertURL"] = json!("https://example.com/cert.pem");
    let input = write(&dir, "payload.json", payload.to_string());

    snsv()
        .args(["verify", "--quiet"])
        .arg(&input)
        .assert()
        .code(4)
        .stderr(predicate::str::is_empty());
}

#[test]
fn verify_reports_bad_env_config() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "payload.json", notification().to_string());

    snsv()
        .env("SNS_VERIFY_MAX_CERTS", "0")
        .arg("verify")
        .arg(&input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("maxCerts must be a positive integer"));
}

#[test]
fn verify_missing_file_is_internal_error() {
    snsv()
        .args(["verify", "/nonexistent/payload.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn extract_key_prints_public_key_pem() {
    let dir = TempDir::new().unwrap();
    let key = sample_key();
    let cert = write(&dir, "cert.pem", certificate_pem(&key));

    snsv()
        .arg("extract-key")
        .arg(&cert)
        .assert()
        .success()
        .stdout(predicate::str::diff(public_key_to_pem(&key)));
}

#[test]
fn extract_key_hex() {
    let dir = TempDir::new().unwrap();
    let key = sample_key();
    let cert = write(&dir, "cert.pem", certificate_pem(&key));

    snsv()
        .args(["extract-key", "--hex"])
        .arg(&cert)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("modulus: {}", key.modulus_hex())))
        .stdout(predicate::str::contains("exponent: 010001"))
        .stdout(predicate::str::contains("bits: 512"));
}

#[test]
fn extract_key_rejects_non_pem() {
    let dir = TempDir::new().unwrap();
    let cert = write(&dir, "cert.pem", "<html>nope</html>");

    snsv()
        .arg("extract-key")
        .arg(&cert)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid PEM formatted message."));
}

#[test]
fn dump_pem_and_der() {
    let dir = TempDir::new().unwrap();
    let key = sample_key();
    let pem_text = public_key_to_pem(&key);
    let pem_path = write(&dir, "key.pem", &pem_text);

    snsv()
        .arg("dump")
        .arg(&pem_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("# PUBLIC KEY"))
        .stdout(predicate::str::contains("OBJECT IDENTIFIER 1.2.840.113549.1.1.1"))
        .stdout(predicate::str::contains("INTEGER 010001"));

    let der = pem::decode(&pem_text).unwrap().remove(0).body;
    let der_path = write(&dir, "key.der", der);

    snsv()
        .arg("dump")
        .arg(&der_path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("SEQUENCE (2 children)"));
}

#[test]
fn dump_truncated_der_fails() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bad.der", [0x30, 0x05, 0x02, 0x01]);

    snsv()
        .arg("dump")
        .arg(&path)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid certificate structure"));
}

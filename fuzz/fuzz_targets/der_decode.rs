#![no_main]

use libfuzzer_sys::fuzz_target;
use sns_verify::asn1::{self, DecodeOptions};
use sns_verify::x509::public_key_from_certificate;

fuzz_target!(|data: &[u8]| {
    if let Ok(node) = asn1::decode(data) {
        let reencoded = asn1::encode(&node);
        assert_eq!(asn1::decode(&reencoded).ok(), Some(node.clone()));
        let _ = public_key_from_certificate(&node);
    }

    let _ = asn1::decode_with(data, DecodeOptions::lenient());
    let _ = asn1::der_to_oid(data);
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use sns_verify::{pem, public_key_pem_from_certificate_pem};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(blocks) = pem::decode(text) {
        for block in &blocks {
            let _ = pem::encode(block);
        }
    }
    let _ = public_key_pem_from_certificate_pem(text);
});

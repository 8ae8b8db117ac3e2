//! `snsv extract-key` - Pull the RSA public key out of a certificate.

use anyhow::Result;
use sns_verify::{public_key_from_certificate_pem, public_key_to_pem};

use crate::cli::args::ExtractKeyArgs;
use crate::cli::helpers::{finish, read_input_text};

pub fn cmd_extract_key(args: ExtractKeyArgs) -> i32 {
    finish(run_extract_key(&args), false)
}

fn run_extract_key(args: &ExtractKeyArgs) -> Result<()> {
    let pem = read_input_text(&args.certificate)?;
    let key = public_key_from_certificate_pem(&pem)?;

    if args.hex {
        println!("bits: {}", key.bits());
        println!("modulus: {}", key.modulus_hex());
        println!("exponent: {}", key.exponent_hex());
    } else {
        print!("{}", public_key_to_pem(&key));
    }
    Ok(())
}

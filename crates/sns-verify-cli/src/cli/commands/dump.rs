//! `snsv dump` - Render the ASN.1 structure of a PEM or DER file.

use anyhow::Result;
use sns_verify::asn1::{self, DecodeOptions};
use sns_verify::{pem, SnsError};

use crate::cli::args::DumpArgs;
use crate::cli::helpers::{finish, read_input};

pub fn cmd_dump(args: DumpArgs) -> i32 {
    finish(run_dump(&args), false)
}

fn run_dump(args: &DumpArgs) -> Result<()> {
    let bytes = read_input(&args.input)?;
    let options = if args.lenient {
        DecodeOptions::lenient()
    } else {
        DecodeOptions::default()
    };

    let is_pem = std::str::from_utf8(&bytes).is_ok_and(|text| text.contains("-----BEGIN "));
    if !is_pem {
        let node = asn1::decode_with(&bytes, options).map_err(SnsError::from)?;
        print!("{}", node.pretty());
        return Ok(());
    }

    let text = String::from_utf8_lossy(&bytes);
    for block in pem::decode(&text).map_err(SnsError::from)? {
        println!("# {}", block.label);
        for header in &block.headers {
            println!("# {}: {}", header.name, header.value);
        }
        let node = asn1::decode_with(&block.body, options).map_err(SnsError::from)?;
        print!("{}", node.pretty());
    }
    Ok(())
}

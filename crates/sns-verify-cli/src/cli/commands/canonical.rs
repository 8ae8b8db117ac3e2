//! `snsv canonical` - Print the signed string of a payload.

use anyhow::Result;
use sns_verify::{canonical_string, MessageType, SnsError, SnsPayload};

use crate::cli::args::CanonicalArgs;
use crate::cli::helpers::{finish, read_input_text};

pub fn cmd_canonical(args: CanonicalArgs) -> i32 {
    finish(run_canonical(&args), false)
}

fn run_canonical(args: &CanonicalArgs) -> Result<()> {
    let body = read_input_text(&args.input)?;
    let payload = SnsPayload::from_json_str(&body).map_err(|e| SnsError::InvalidJson {
        reason: e.to_string(),
    })?;
    let message_type = MessageType::from_payload(&payload)?;

    print!("{}", canonical_string(&payload, message_type.signed_fields()));
    Ok(())
}

//! `snsv verify` - Validate a payload end to end.

use anyhow::Result;
use sns_verify::{RawRequest, Validator, ValidatorConfig};

use crate::cli::args::VerifyArgs;
use crate::cli::helpers::{finish, read_input_text};

pub async fn cmd_verify(args: VerifyArgs) -> i32 {
    let result = run_verify(&args).await;
    finish(result, args.quiet)
}

async fn run_verify(args: &VerifyArgs) -> Result<()> {
    let mut config = ValidatorConfig::from_env()?;
    if args.no_cache {
        config = config.with_use_cache(false);
    }
    if args.no_auto_subscribe {
        config = config.with_auto_subscribe(false);
    }
    if args.no_auto_resubscribe {
        config = config.with_auto_resubscribe(false);
    }

    let body = read_input_text(&args.input)?;
    let validator = Validator::new(config)?;
    let payload = validator.validate(&RawRequest::post(body)).await?;

    if !args.quiet {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }
    Ok(())
}

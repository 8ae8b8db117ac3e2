use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use sns_verify::SnsError;

use crate::exit_codes;

/// Read `path` as bytes; "-" reads stdin.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn read_input_text(path: &Path) -> Result<String> {
    let bytes = read_input(path)?;
    String::from_utf8(bytes).with_context(|| format!("{} is not UTF-8", path.display()))
}

/// Exit code for a command failure: the fault's own code when it is a
/// validation fault, otherwise an internal error.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<SnsError>()
        .map(SnsError::exit_code)
        .unwrap_or(exit_codes::INTERNAL_ERROR)
}

/// Report `result` on stderr and turn it into an exit code.
pub fn finish(result: Result<()>, quiet: bool) -> i32 {
    match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            if !quiet {
                eprintln!("error: {e:#}");
            }
            exit_code_for(&e)
        }
    }
}

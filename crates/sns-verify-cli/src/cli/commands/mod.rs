use super::args::{Cli, Command};

pub mod canonical;
pub mod dump;
pub mod extract_key;
pub mod verify;

pub async fn dispatch(cli: Cli) -> i32 {
    match cli.cmd {
        Command::Verify(args) => verify::cmd_verify(args).await,
        Command::Canonical(args) => canonical::cmd_canonical(args),
        Command::ExtractKey(args) => extract_key::cmd_extract_key(args),
        Command::Dump(args) => dump::cmd_dump(args),
    }
}

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "snsv",
    version,
    about = "Verify Amazon SNS webhook signatures and inspect signing certificates"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate an SNS payload as if it arrived in a POST body
    Verify(VerifyArgs),
    /// Print the canonical string a payload was signed over
    Canonical(CanonicalArgs),
    /// Extract the RSA public key from a certificate PEM
    ExtractKey(ExtractKeyArgs),
    /// Print the ASN.1 tree of a PEM or DER file
    Dump(DumpArgs),
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Payload JSON file, or "-" for stdin
    pub input: PathBuf,

    /// Do not cache signing certificates
    #[arg(long)]
    pub no_cache: bool,

    /// Do not visit SubscribeURL for SubscriptionConfirmation messages
    #[arg(long)]
    pub no_auto_subscribe: bool,

    /// Do not visit SubscribeURL for UnsubscribeConfirmation messages
    #[arg(long)]
    pub no_auto_resubscribe: bool,

    /// Quiet mode - only exit code, no output
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct CanonicalArgs {
    /// Payload JSON file, or "-" for stdin
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct ExtractKeyArgs {
    /// Certificate PEM file, or "-" for stdin
    pub certificate: PathBuf,

    /// Print modulus and exponent as hex instead of a PUBLIC KEY PEM
    #[arg(long)]
    pub hex: bool,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// PEM or DER file
    pub input: PathBuf,

    /// Accept indefinite lengths and overlong length fields
    #[arg(long)]
    pub lenient: bool,
}

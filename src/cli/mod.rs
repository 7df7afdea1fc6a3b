//! Command-line interface.

pub mod commands;
pub mod output;

use clap::Parser;

/// Cryptpipe - streaming file encryption with pluggable key sources.
#[derive(Parser)]
#[command(
    name = "cryptpipe",
    about = "Encrypt or decrypt a file through an authenticated stream cipher",
    version
)]
pub struct Cli {
    /// Input file, or `-` for standard input
    pub input: String,

    /// Output file, or `-` for standard output
    pub output: String,

    /// Key locator (base64key://<encoded-key>, hashivault://<key-name>?version=<n>)
    #[arg(short, long, env = "CRYPTPIPE_KEY", value_name = "LOCATOR")]
    pub key: String,

    /// Decrypt the input instead of encrypting it
    #[arg(short, long)]
    pub decrypt: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

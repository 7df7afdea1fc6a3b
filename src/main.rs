//! Cryptpipe - streaming file encryption with pluggable key sources.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cryptpipe::cli::output;
use cryptpipe::cli::{commands, Cli};
use cryptpipe::error::{CipherError, Error, KeyError};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("CRYPTPIPE_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("cryptpipe=debug")
        } else {
            EnvFilter::new("cryptpipe=warn")
        }
    });

    // Logs go to stderr: stdout may be carrying ciphertext
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = commands::execute(cli) {
        let hint = match &e {
            Error::Key(KeyError::BackendUnavailable(_)) => {
                Some("set VAULT_SERVER_URL and VAULT_SERVER_TOKEN")
            }
            Error::Cipher(CipherError::Authentication) => {
                Some("check the key locator and that the input is a cryptpipe stream")
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = hint {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}

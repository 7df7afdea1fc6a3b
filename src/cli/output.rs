//! Styled terminal output helpers.
//!
//! Everything goes to stderr: stdout may be carrying ciphertext.

use console::style;

/// Print an error message.
///
/// Example: `✗ key not found: backups (version latest)`
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red(), msg);
}

/// Print a hint message.
///
/// Example: `→ set VAULT_SERVER_URL and VAULT_SERVER_TOKEN`
pub fn hint(msg: &str) {
    eprintln!("{} {}", style("→").cyan(), style(msg).cyan());
}

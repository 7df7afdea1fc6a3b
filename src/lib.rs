//! Cryptpipe - streaming file encryption with pluggable key sources.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── commands      # Invocation orchestration
//! │   └── output        # Styled terminal output
//! └── core/             # Core library components
//!     ├── locator       # Key locator (URI) parsing
//!     ├── keysource/    # Key backends
//!     │   ├── mod       # KeySource trait + scheme dispatch
//!     │   ├── inline    # base64key:// inline keys
//!     │   └── transit   # hashivault:// transit key export
//!     ├── vault         # Secret-store HTTP client
//!     ├── codec         # Authenticated stream codec (Read adapters)
//!     ├── pipeline      # Bounded-memory encrypt/decrypt copy
//!     └── progress      # Progress observer + spinner
//! ```
//!
//! # Features
//!
//! - Keys resolved from an inline base64 locator or a Vault transit key export
//! - Authenticated streaming encryption (XChaCha20-Poly1305 STREAM)
//! - Bounded memory: fixed 64 KiB chunks regardless of payload size
//! - `-` as source or sink for stdin/stdout piping

pub mod cli;
pub mod core;
pub mod error;

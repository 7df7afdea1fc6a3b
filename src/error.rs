use thiserror::Error;

/// Failures while turning a key locator into raw key material.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("invalid key locator: {0}")]
    Parse(String),

    #[error("unsupported key scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid base64 key: {0}")]
    Decode(String),

    #[error("key backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("unexpected secret shape: {0}")]
    Schema(String),
}

/// Failures inside the streaming cipher pipeline.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("authentication failed: wrong key or corrupted input")]
    Authentication,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

//! Inline base64 key backend.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::Zeroizing;

use super::{KeySource, ResolvedKey};
use crate::core::locator::KeyLocator;
use crate::error::KeyError;

/// Backend for `base64key://<base64-encoded-bytes>` locators.
///
/// The identifier is the key itself, standard-alphabet base64. Nothing
/// leaves the process.
pub struct InlineKeySource;

impl KeySource for InlineKeySource {
    fn scheme(&self) -> &'static str {
        "base64key"
    }

    fn resolve(&self, locator: &KeyLocator) -> Result<ResolvedKey, KeyError> {
        let bytes = Zeroizing::new(
            STANDARD
                .decode(locator.identifier())
                .map_err(|e| KeyError::Decode(e.to_string()))?,
        );
        if bytes.is_empty() {
            return Err(KeyError::Decode("decoded key is empty".into()));
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(raw: &str) -> Result<ResolvedKey, KeyError> {
        InlineKeySource.resolve(&KeyLocator::parse(raw).unwrap())
    }

    #[test]
    fn test_resolve_decodes_identifier() {
        let key = resolve("base64key://QUJD").unwrap();
        assert_eq!(&key[..], b"ABC");
    }

    #[test]
    fn test_malformed_base64_fails() {
        let err = resolve("base64key://not-valid-base64!!").unwrap_err();
        assert!(matches!(err, KeyError::Decode(_)));
    }

    #[test]
    fn test_empty_key_fails() {
        let err = resolve("base64key://").unwrap_err();
        assert!(matches!(err, KeyError::Decode(_)));
    }
}

//! Key locator parsing.
//!
//! A key locator is a URI-shaped string identifying where and how to obtain
//! key material: the scheme selects a backend, the host part is a
//! backend-specific identifier, and query parameters carry backend options.
//!
//! ```text
//! base64key://<base64-encoded-bytes>
//! hashivault://<key-name>?version=<version>
//! ```

use url::Url;

use crate::error::KeyError;

/// A parsed key locator. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLocator {
    scheme: String,
    identifier: String,
    params: Vec<(String, String)>,
}

impl KeyLocator {
    /// Parse a raw locator string using generic URI syntax.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::Parse` if the string is not syntactically a URI.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        let url = Url::parse(raw).map_err(|e| KeyError::Parse(format!("{raw}: {e}")))?;

        Ok(Self {
            scheme: url.scheme().to_string(),
            identifier: url.host_str().unwrap_or_default().to_string(),
            params: url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        })
    }

    /// URI scheme, always non-empty. Matched case-sensitively against backends.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Backend-specific identifier (the URI host part). May be empty.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// First value of a query parameter, if present.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inline_locator() {
        let locator = KeyLocator::parse("base64key://QUJD").unwrap();
        assert_eq!(locator.scheme(), "base64key");
        assert_eq!(locator.identifier(), "QUJD");
        assert_eq!(locator.param("version"), None);
    }

    #[test]
    fn test_parse_transit_locator_with_version() {
        let locator = KeyLocator::parse("hashivault://backups?version=3").unwrap();
        assert_eq!(locator.scheme(), "hashivault");
        assert_eq!(locator.identifier(), "backups");
        assert_eq!(locator.param("version"), Some("3"));
    }

    #[test]
    fn test_parse_preserves_identifier_case() {
        let locator = KeyLocator::parse("base64key://aGVsbG8K").unwrap();
        assert_eq!(locator.identifier(), "aGVsbG8K");
    }

    #[test]
    fn test_parse_rejects_non_uri() {
        let err = KeyLocator::parse("not a locator").unwrap_err();
        assert!(matches!(err, KeyError::Parse(_)));
    }

    #[test]
    fn test_parse_empty_identifier() {
        let locator = KeyLocator::parse("base64key://").unwrap();
        assert_eq!(locator.identifier(), "");
    }

    #[test]
    fn test_unknown_scheme_is_representable() {
        let locator = KeyLocator::parse("foo://bar").unwrap();
        assert_eq!(locator.scheme(), "foo");
        assert_eq!(locator.identifier(), "bar");
    }
}

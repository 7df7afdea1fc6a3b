//! Tests for key locator parsing and backend dispatch.

use cryptpipe::core::keysource::{KeyResolver, KeySource, TransitKeySource};
use cryptpipe::core::locator::KeyLocator;
use cryptpipe::core::vault::SecretStore;
use cryptpipe::error::KeyError;

fn resolver() -> KeyResolver {
    // no vault config: the transit backend reports unavailable if reached
    KeyResolver::with_defaults(None)
}

#[test]
fn test_inline_key_resolves() {
    let locator = KeyLocator::parse("base64key://QUJD").unwrap();
    let key = resolver().resolve(&locator).unwrap();
    assert_eq!(&key[..], b"ABC");
}

#[test]
fn test_unsupported_scheme_fails() {
    let locator = KeyLocator::parse("foo://bar").unwrap();
    let err = resolver().resolve(&locator).unwrap_err();
    assert!(matches!(err, KeyError::UnsupportedScheme(s) if s == "foo"));
}

#[test]
fn test_malformed_inline_key_fails_without_network() {
    let locator = KeyLocator::parse("base64key://not-valid-base64!!").unwrap();
    let err = resolver().resolve(&locator).unwrap_err();
    assert!(matches!(err, KeyError::Decode(_)));
}

#[test]
fn test_transit_without_configuration_is_backend_unavailable() {
    let locator = KeyLocator::parse("hashivault://backups").unwrap();
    let err = resolver().resolve(&locator).unwrap_err();
    assert!(matches!(err, KeyError::BackendUnavailable(_)));
}

#[test]
fn test_locator_that_is_not_a_uri_fails_to_parse() {
    let err = KeyLocator::parse("just some words").unwrap_err();
    assert!(matches!(err, KeyError::Parse(_)));
}

/// A store that always answers with the same secret.
struct StaticStore(Option<serde_json::Value>);

impl SecretStore for StaticStore {
    fn read(
        &self,
        _path: &str,
        _params: &[(&str, &str)],
    ) -> Result<Option<serde_json::Value>, KeyError> {
        Ok(self.0.clone())
    }
}

#[test]
fn test_transit_backend_through_injected_store() {
    let store = StaticStore(Some(serde_json::json!({ "keys": { "1": "c2VjcmV0" } })));
    let source = TransitKeySource::with_store(Box::new(store));
    let locator = KeyLocator::parse("hashivault://backups?version=1").unwrap();

    let key = source.resolve(&locator).unwrap();
    assert_eq!(&key[..], b"secret");
}

#[test]
fn test_transit_absent_secret_is_key_not_found() {
    let source = TransitKeySource::with_store(Box::new(StaticStore(None)));
    let locator = KeyLocator::parse("hashivault://missing").unwrap();

    let err = source.resolve(&locator).unwrap_err();
    assert!(matches!(err, KeyError::KeyNotFound(_)));
}

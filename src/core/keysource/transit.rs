//! Vault transit key-export backend.
//!
//! Resolves `hashivault://<key-name>?version=<version>` locators with one
//! read against the transit engine's export endpoint:
//!
//! ```text
//! transit/export/encryption-key/<name>/<version>
//! ```
//!
//! An omitted or empty `version` asks the server for `latest`. The response
//! carries a `keys` mapping of version identifiers to base64 fragments; all
//! fragments are decoded and concatenated into one key, ordered by version
//! identifier (numeric ascending, then non-numeric lexicographic) so the
//! same secret always yields the same key bytes.

use std::cmp::Ordering;
use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use tracing::debug;
use zeroize::Zeroizing;

use super::{KeySource, ResolvedKey};
use crate::core::locator::KeyLocator;
use crate::core::vault::{SecretStore, VaultClient, VaultConfig};
use crate::error::KeyError;

/// Version sentinel the export endpoint resolves to the newest key.
const LATEST: &str = "latest";

/// Shape of the transit export payload under the response's `data` field.
#[derive(Debug, Deserialize)]
struct ExportedKeys {
    keys: Option<HashMap<String, String>>,
}

/// Backend for `hashivault://` locators.
pub struct TransitKeySource {
    config: Option<VaultConfig>,
    store: Option<Box<dyn SecretStore>>,
}

impl TransitKeySource {
    /// Backend that connects with the given configuration on first use.
    ///
    /// `None` config is representable so the resolver can still dispatch to
    /// this backend and report `BackendUnavailable` instead of an unknown
    /// scheme.
    pub fn new(config: Option<VaultConfig>) -> Self {
        Self {
            config,
            store: None,
        }
    }

    /// Backend reading through a caller-supplied store.
    pub fn with_store(store: Box<dyn SecretStore>) -> Self {
        Self {
            config: None,
            store: Some(store),
        }
    }
}

impl KeySource for TransitKeySource {
    fn scheme(&self) -> &'static str {
        "hashivault"
    }

    fn resolve(&self, locator: &KeyLocator) -> Result<ResolvedKey, KeyError> {
        let version = match locator.param("version") {
            Some(v) if !v.is_empty() => v,
            _ => LATEST,
        };

        match &self.store {
            Some(store) => export(store.as_ref(), locator.identifier(), version),
            None => {
                let config = self.config.clone().ok_or_else(|| {
                    KeyError::BackendUnavailable(
                        "VAULT_SERVER_URL and VAULT_SERVER_TOKEN are not set".into(),
                    )
                })?;
                let client = VaultClient::new(config)?;
                export(&client, locator.identifier(), version)
            }
        }
    }
}

/// Read and assemble an exported transit key from the store.
///
/// # Errors
///
/// `KeyNotFound` when the store has no secret at the export path, `Schema`
/// when the response is missing or mistypes the `keys` mapping, `Decode`
/// when a fragment is not valid base64.
pub fn export(
    store: &dyn SecretStore,
    name: &str,
    version: &str,
) -> Result<ResolvedKey, KeyError> {
    let path = format!("transit/export/encryption-key/{name}/{version}");
    debug!(%name, %version, "exporting transit key");

    let data = store
        .read(&path, &[])?
        .ok_or_else(|| KeyError::KeyNotFound(format!("{name} (version {version})")))?;

    let payload: ExportedKeys = serde_json::from_value(data)
        .map_err(|e| KeyError::Schema(format!("transit export response: {e}")))?;
    let keys = payload
        .keys
        .ok_or_else(|| KeyError::Schema("transit export response has no keys field".into()))?;
    if keys.is_empty() {
        return Err(KeyError::Schema("transit export returned no key fragments".into()));
    }

    let mut fragments: Vec<(&String, &String)> = keys.iter().collect();
    fragments.sort_by(|a, b| version_order(a.0, b.0));

    let mut bytes = Zeroizing::new(Vec::new());
    for (id, fragment) in fragments {
        let decoded = Zeroizing::new(
            STANDARD
                .decode(fragment)
                .map_err(|_| KeyError::Decode(format!("key fragment {id}")))?,
        );
        bytes.extend_from_slice(&decoded);
    }
    Ok(bytes)
}

/// Deterministic fragment order: numeric version identifiers ascending,
/// non-numeric ones after them, lexicographically.
fn version_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

//! Minimal Vault secret-store client.
//!
//! Speaks just enough of the Vault HTTP API to read a single logical path:
//! `GET <address>/v1/<path>` with an `X-Vault-Token` header. The rest of the
//! API surface (auth methods, leases, writes) is out of scope.

use serde::Deserialize;
use tracing::debug;

use crate::error::KeyError;

/// Connection settings for the remote secret store.
///
/// Read from the environment exactly once at startup and passed into the
/// transit backend constructor; never consulted ad hoc from backend logic.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub address: String,
    pub token: String,
}

impl VaultConfig {
    /// Build from `VAULT_SERVER_URL` and `VAULT_SERVER_TOKEN`.
    ///
    /// Returns `None` when either variable is missing or empty, which the
    /// transit backend reports as `BackendUnavailable` if it is ever asked
    /// to resolve a key.
    pub fn from_env() -> Option<Self> {
        let address = std::env::var("VAULT_SERVER_URL")
            .ok()
            .filter(|v| !v.is_empty())?;
        let token = std::env::var("VAULT_SERVER_TOKEN")
            .ok()
            .filter(|v| !v.is_empty())?;
        Some(Self { address, token })
    }
}

/// Read capability over a secret store.
///
/// `Ok(None)` means the path exists in no secret (the store answered, but
/// there is nothing there). Transport and protocol faults are errors.
pub trait SecretStore {
    fn read(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<serde_json::Value>, KeyError>;
}

/// Envelope every Vault read response arrives in.
#[derive(Debug, Deserialize)]
struct ReadResponse {
    data: Option<serde_json::Value>,
}

/// Blocking HTTP client for a Vault server.
pub struct VaultClient {
    http: reqwest::blocking::Client,
    config: VaultConfig,
}

impl VaultClient {
    /// # Errors
    ///
    /// Returns `KeyError::BackendUnavailable` if the HTTP client cannot be
    /// constructed.
    pub fn new(config: VaultConfig) -> Result<Self, KeyError> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| KeyError::BackendUnavailable(format!("http client: {e}")))?;
        Ok(Self { http, config })
    }
}

impl SecretStore for VaultClient {
    fn read(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<serde_json::Value>, KeyError> {
        let url = format!("{}/v1/{}", self.config.address.trim_end_matches('/'), path);
        debug!(%path, "reading secret");

        let mut request = self.http.get(&url).header("X-Vault-Token", &self.config.token);
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request
            .send()
            .map_err(|e| KeyError::BackendUnavailable(format!("vault request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(KeyError::BackendUnavailable(format!(
                "vault returned {} for {path}",
                response.status()
            )));
        }

        let body: ReadResponse = response
            .json()
            .map_err(|e| KeyError::Schema(format!("vault response body: {e}")))?;
        Ok(body.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Serialized with the env-var tests in the integration suite: this is the
    // only in-process test that touches VAULT_SERVER_*.
    #[test]
    fn test_config_from_env_requires_both_variables() {
        std::env::remove_var("VAULT_SERVER_URL");
        std::env::remove_var("VAULT_SERVER_TOKEN");
        assert!(VaultConfig::from_env().is_none());

        std::env::set_var("VAULT_SERVER_URL", "http://127.0.0.1:8200");
        assert!(VaultConfig::from_env().is_none());

        std::env::set_var("VAULT_SERVER_TOKEN", "s.token");
        let config = VaultConfig::from_env().unwrap();
        assert_eq!(config.address, "http://127.0.0.1:8200");
        assert_eq!(config.token, "s.token");

        std::env::remove_var("VAULT_SERVER_URL");
        std::env::remove_var("VAULT_SERVER_TOKEN");
    }
}

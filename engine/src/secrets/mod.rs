//! Secret management
//!
//! Resolves API keys without ever letting them reach logs. Lookup order is
//! environment variable first (simple for containers and CI), then the OS
//! keyring under the `lino` service name.

use sdk::errors::AssistantError;
use std::fmt;
use zeroize::Zeroize;

/// Keyring service name under which Lino secrets are stored
const KEYRING_SERVICE: &str = "lino";

/// A sensitive string that redacts itself in `Debug`/`Display` output and
/// zeroes its memory on drop. Use `expose()` to read the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw underlying value
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Named secrets the engine needs at runtime
pub mod keys {
    /// Gemini API key (env `GEMINI_API_KEY`, keyring entry `gemini_api_key`)
    pub const GEMINI_API_KEY: &str = "gemini_api_key";

    /// Linear API key (env `LINEAR_API_KEY`, keyring entry `linear_api_key`)
    pub const LINEAR_API_KEY: &str = "linear_api_key";
}

/// Resolves secrets from the environment or the OS keyring.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretStore;

impl SecretStore {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a secret by its entry name.
    ///
    /// `gemini_api_key` resolves from `GEMINI_API_KEY` when set, otherwise
    /// from the keyring entry of the same name.
    pub fn get(&self, name: &str) -> Result<SecretString, AssistantError> {
        let env_var = name.to_ascii_uppercase();
        if let Ok(value) = std::env::var(&env_var) {
            if !value.trim().is_empty() {
                return Ok(SecretString::new(value));
            }
        }

        let entry = keyring::Entry::new(KEYRING_SERVICE, name)
            .map_err(|e| AssistantError::MissingSecret(format!("{name}: {e}")))?;
        match entry.get_password() {
            Ok(value) => Ok(SecretString::new(value)),
            Err(_) => Err(AssistantError::MissingSecret(format!(
                "{name} (set {env_var} or store it in the keyring)"
            ))),
        }
    }
}

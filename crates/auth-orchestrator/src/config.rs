//! Configuration for the authentication engine.

use alloy::primitives::Address;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Default credential backend endpoint (overridable at compile time).
pub const DEFAULT_PASSKEY_API_URL: &str = match option_env!("GG_PASSKEY_API_URL") {
    Some(url) => url,
    None => "https://api.greengoods.app/passkeys",
};

/// Default publishable API key (overridable at compile time).
pub const DEFAULT_PASSKEY_API_KEY: &str = match option_env!("GG_PASSKEY_API_KEY") {
    Some(key) => key,
    None => "gg-publishable-dev",
};

/// Default account-abstraction bundler endpoint.
pub const DEFAULT_BUNDLER_URL: &str = match option_env!("GG_BUNDLER_URL") {
    Some(url) => url,
    None => "https://bundler.greengoods.app/rpc",
};

/// Default chain (Arbitrum One).
pub const DEFAULT_CHAIN_ID: u64 = 42_161;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential backend RPC endpoint.
    pub passkey_api_url: String,
    /// Publishable API key for the credential backend.
    pub passkey_api_key: String,
    /// Bundler RPC endpoint for smart-account sessions.
    pub bundler_url: String,
    /// Chain the engine builds sessions for.
    pub chain_id: u64,
    /// ENS registrar address; `None` disables claiming entirely.
    pub ens_registrar: Option<Address>,
    /// Per-attempt timeout for silent session restore.
    pub restore_attempt_timeout: Duration,
    /// Retries after the first restore attempt fails.
    pub restore_max_retries: u32,
    /// Base delay of the restore backoff (doubles per retry).
    pub restore_backoff_base: Duration,
    /// How long the biometric assertion prompt may stay open.
    pub assertion_timeout: Duration,
    /// Consecutive failed authentications before RETRY gives up.
    pub max_auth_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            passkey_api_url: DEFAULT_PASSKEY_API_URL.to_string(),
            passkey_api_key: DEFAULT_PASSKEY_API_KEY.to_string(),
            bundler_url: DEFAULT_BUNDLER_URL.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            ens_registrar: None,
            restore_attempt_timeout: Duration::from_secs(15),
            restore_max_retries: 2,
            restore_backoff_base: Duration::from_secs(1),
            assertion_timeout: Duration::from_secs(60),
            max_auth_retries: 3,
        }
    }
}

impl Config {
    /// Create a config from defaults, then apply environment overrides.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Apply runtime environment overrides.
    pub fn load_from_env(&mut self) {
        if let Ok(url) = std::env::var("GG_PASSKEY_API_URL") {
            if !url.is_empty() {
                self.passkey_api_url = url;
            }
        }
        if let Ok(key) = std::env::var("GG_PASSKEY_API_KEY") {
            if !key.is_empty() {
                self.passkey_api_key = key;
            }
        }
        if let Ok(url) = std::env::var("GG_BUNDLER_URL") {
            if !url.is_empty() {
                self.bundler_url = url;
            }
        }
        if let Ok(raw) = std::env::var("GG_CHAIN_ID") {
            match raw.parse() {
                Ok(id) => self.chain_id = id,
                Err(_) => warn!(value = %raw, "Ignoring unparseable GG_CHAIN_ID"),
            }
        }
        if let Ok(raw) = std::env::var("GG_ENS_REGISTRAR") {
            match Address::from_str(&raw) {
                Ok(addr) => self.ens_registrar = Some(addr),
                Err(_) => warn!(value = %raw, "Ignoring unparseable GG_ENS_REGISTRAR"),
            }
        }
    }

    /// Delay before the given restore retry (0-indexed): base * 2^attempt.
    pub fn restore_delay_for_attempt(&self, attempt: u32) -> Duration {
        self.restore_backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_operation_budget() {
        let config = Config::default();
        assert_eq!(config.restore_attempt_timeout, Duration::from_secs(15));
        assert_eq!(config.restore_max_retries, 2);
        assert_eq!(config.assertion_timeout, Duration::from_secs(60));
        assert_eq!(config.max_auth_retries, 3);
        assert!(config.ens_registrar.is_none());
    }

    #[test]
    fn restore_backoff_is_exponential() {
        let config = Config::default();
        assert_eq!(config.restore_delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.restore_delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(config.restore_delay_for_attempt(2), Duration::from_secs(4));
    }
}

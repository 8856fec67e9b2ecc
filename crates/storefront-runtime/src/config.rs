//! # Storefront Configuration
//!
//! Timeouts and retention limits for the three storefront components.
//!
//! Resolution order: built-in defaults, then the TOML file, then the
//! environment, then validation.
//!
//! ```toml
//! [wallet]
//! connect_timeout_ms = 30000
//!
//! [payments]
//! refresh_timeout_ms = 10000
//! provider_timeout_ms = 30000
//! max_retained_attempts = 256
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sf_01_wallet_session::WalletSessionConfig;
use sf_02_payment_methods::RegistryConfig;
use sf_03_purchase::PurchaseConfig;

pub const ENV_CONNECT_TIMEOUT_MS: &str = "SF_CONNECT_TIMEOUT_MS";
pub const ENV_REFRESH_TIMEOUT_MS: &str = "SF_REFRESH_TIMEOUT_MS";
pub const ENV_PROVIDER_TIMEOUT_MS: &str = "SF_PROVIDER_TIMEOUT_MS";
pub const ENV_MAX_RETAINED_ATTEMPTS: &str = "SF_MAX_RETAINED_ATTEMPTS";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable {var} has invalid value {value:?}")]
    Env { var: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete storefront configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub wallet: WalletSection,
    pub payments: PaymentsSection,
}

/// Wallet session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletSection {
    /// Upper bound on a provider connect or disconnect.
    pub connect_timeout_ms: u64,
}

impl Default for WalletSection {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 30_000,
        }
    }
}

/// Payment method and purchase settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsSection {
    /// Upper bound on a payment method refresh.
    pub refresh_timeout_ms: u64,
    /// Upper bound on each catalog and gateway call of a purchase.
    pub provider_timeout_ms: u64,
    /// Finished purchase attempts kept for queries.
    pub max_retained_attempts: usize,
}

impl Default for PaymentsSection {
    fn default() -> Self {
        Self {
            refresh_timeout_ms: 10_000,
            provider_timeout_ms: 30_000,
            max_retained_attempts: 256,
        }
    }
}

impl StorefrontConfig {
    /// Load from a TOML file, apply environment overrides and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&raw)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Override from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Override from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = parse_var::<u64, _>(&lookup, ENV_CONNECT_TIMEOUT_MS)? {
            self.wallet.connect_timeout_ms = value;
        }
        if let Some(value) = parse_var::<u64, _>(&lookup, ENV_REFRESH_TIMEOUT_MS)? {
            self.payments.refresh_timeout_ms = value;
        }
        if let Some(value) = parse_var::<u64, _>(&lookup, ENV_PROVIDER_TIMEOUT_MS)? {
            self.payments.provider_timeout_ms = value;
        }
        if let Some(value) = parse_var::<usize, _>(&lookup, ENV_MAX_RETAINED_ATTEMPTS)? {
            self.payments.max_retained_attempts = value;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wallet.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "wallet.connect_timeout_ms must be non-zero".into(),
            ));
        }
        if self.payments.refresh_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "payments.refresh_timeout_ms must be non-zero".into(),
            ));
        }
        if self.payments.provider_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "payments.provider_timeout_ms must be non-zero".into(),
            ));
        }
        if self.payments.max_retained_attempts == 0 {
            return Err(ConfigError::Invalid(
                "payments.max_retained_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn wallet_config(&self) -> WalletSessionConfig {
        WalletSessionConfig {
            connect_timeout: Duration::from_millis(self.wallet.connect_timeout_ms),
        }
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            refresh_timeout: Duration::from_millis(self.payments.refresh_timeout_ms),
        }
    }

    pub fn purchase_config(&self) -> PurchaseConfig {
        PurchaseConfig {
            provider_timeout: Duration::from_millis(self.payments.provider_timeout_ms),
            max_retained_attempts: self.payments.max_retained_attempts,
        }
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env { var, value }),
    }
}

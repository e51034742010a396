//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config/mainnet.toml.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::adapters::jupiter::JupiterConfig;
use crate::application::{ExecutionConfig, SwapOptions};
use crate::ports::network::CommitmentLevel;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub jupiter: JupiterSection,
    pub solana: SolanaSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Jupiter API configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct JupiterSection {
    /// Jupiter v1 API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Slippage tolerance in percent (0.5 = 0.5%)
    pub slippage_pct: f64,
    /// Only consider single-hop routes
    #[serde(default)]
    pub only_direct_routes: bool,
    /// Wrap/unwrap native SOL around the swap; left to the API if unset
    #[serde(default)]
    pub wrap_unwrap_sol: Option<bool>,
    /// Platform fee in basis points
    #[serde(default)]
    pub fee_bps: Option<u16>,
    /// Token account receiving the platform fee
    #[serde(default)]
    pub fee_account: Option<String>,
}

/// Solana RPC configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct SolanaSection {
    /// RPC endpoint (use private RPC for production)
    pub rpc_url: String,
    /// Wallet keypair path (NEVER commit this file!)
    pub keypair_path: String,
    /// Commitment level: "processed", "confirmed", "finalized"
    #[serde(default)]
    pub commitment: CommitmentLevel,
    /// How long to wait for each transaction to confirm
    pub confirmation_timeout_secs: u64,
    /// Interval between signature status polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl SolanaSection {
    /// Get RPC URL with environment variable override
    /// Checks SOLANA_RPC_URL env var first, falls back to config value
    pub fn get_rpc_url(&self) -> String {
        std::env::var("SOLANA_RPC_URL").unwrap_or_else(|_| self.rpc_url.clone())
    }

    /// Get keypair path with environment variable override, `~` expanded
    /// Checks SOLANA_KEYPAIR_PATH env var first, falls back to config value
    pub fn get_keypair_path(&self) -> String {
        let raw = std::env::var("SOLANA_KEYPAIR_PATH").unwrap_or_else(|_| self.keypair_path.clone());
        shellexpand::tilde(&raw).to_string()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_api_url() -> String {
    JupiterConfig::default().api_base_url
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate Jupiter
        if self.jupiter.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api_url cannot be empty".to_string(),
            ));
        }

        if self.jupiter.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        if !(self.jupiter.slippage_pct > 0.0 && self.jupiter.slippage_pct <= 100.0) {
            return Err(ConfigError::ValidationError(format!(
                "slippage_pct must be 0-100, got {}",
                self.jupiter.slippage_pct
            )));
        }

        if let Some(fee_bps) = self.jupiter.fee_bps {
            if fee_bps > 10_000 {
                return Err(ConfigError::ValidationError(format!(
                    "fee_bps must be <= 10000, got {}",
                    fee_bps
                )));
            }
        }

        // Validate Solana
        if self.solana.rpc_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "rpc_url cannot be empty".to_string(),
            ));
        }

        if self.solana.keypair_path.is_empty() {
            return Err(ConfigError::ValidationError(
                "keypair_path cannot be empty".to_string(),
            ));
        }

        if self.solana.confirmation_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "confirmation_timeout_secs must be > 0".to_string(),
            ));
        }

        if self.solana.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be > 0".to_string(),
            ));
        }

        // Validate logging
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging level must be one of {:?}, got '{}'",
                LOG_LEVELS, self.logging.level
            )));
        }

        Ok(())
    }

    pub fn jupiter_config(&self) -> JupiterConfig {
        JupiterConfig {
            api_base_url: self.jupiter.api_url.clone(),
            timeout: Duration::from_secs(self.jupiter.timeout_secs),
        }
    }

    pub fn execution_config(&self) -> ExecutionConfig {
        ExecutionConfig::new(Duration::from_secs(self.solana.confirmation_timeout_secs))
            .with_commitment(self.solana.commitment)
    }

    pub fn swap_options(&self) -> SwapOptions {
        SwapOptions {
            wrap_unwrap_sol: self.jupiter.wrap_unwrap_sol,
            fee_account: self.jupiter.fee_account.clone(),
            token_ledger: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r#"
[jupiter]
api_url = "https://quote-api.jup.ag"
timeout_secs = 20
slippage_pct = 0.5
only_direct_routes = false
wrap_unwrap_sol = true
fee_bps = 4

[solana]
rpc_url = "https://api.mainnet-beta.solana.com"
keypair_path = "~/.config/solana/id.json"
commitment = "finalized"
confirmation_timeout_secs = 60

[logging]
level = "debug"
"#
        .to_string()
    }

    fn parse(toml_str: &str) -> Config {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_load_valid_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(create_valid_config().as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.jupiter.timeout_secs, 20);
        assert_eq!(config.jupiter.fee_bps, Some(4));
        assert_eq!(config.solana.commitment, CommitmentLevel::Finalized);
        assert_eq!(config.solana.poll_interval_ms, 500);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[jupiter\nslippage_pct = ").unwrap();
        temp_file.flush().unwrap();

        let result = load_config(temp_file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse(
            r#"
[jupiter]
slippage_pct = 1.0

[solana]
rpc_url = "http://127.0.0.1:8899"
keypair_path = "/tmp/id.json"
confirmation_timeout_secs = 30
"#,
        );

        assert!(config.validate().is_ok());
        assert_eq!(config.jupiter.api_url, "https://quote-api.jup.ag");
        assert_eq!(config.jupiter.timeout_secs, 30);
        assert!(config.jupiter.wrap_unwrap_sol.is_none());
        assert_eq!(config.solana.commitment, CommitmentLevel::Confirmed);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_confirmation_timeout_required() {
        let result: Result<Config, _> = toml::from_str(
            r#"
[jupiter]
slippage_pct = 1.0

[solana]
rpc_url = "http://127.0.0.1:8899"
keypair_path = "/tmp/id.json"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_confirmation_timeout_rejected() {
        let mut config = parse(&create_valid_config());
        config.solana.confirmation_timeout_secs = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("confirmation_timeout_secs"));
    }

    #[test]
    fn test_invalid_slippage() {
        let mut config = parse(&create_valid_config());
        config.jupiter.slippage_pct = 0.0;
        assert!(config.validate().is_err());

        config.jupiter.slippage_pct = 150.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_commitment_rejected() {
        let result: Result<Config, _> =
            toml::from_str(&create_valid_config().replace("finalized", "rooted"));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = parse(&create_valid_config());
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_derived_configs() {
        let config = parse(&create_valid_config());

        let exec = config.execution_config();
        assert_eq!(exec.commitment, CommitmentLevel::Finalized);
        assert_eq!(exec.confirmation_timeout, Duration::from_secs(60));

        let jupiter = config.jupiter_config();
        assert_eq!(jupiter.timeout, Duration::from_secs(20));

        let options = config.swap_options();
        assert_eq!(options.wrap_unwrap_sol, Some(true));
        assert!(options.fee_account.is_none());
    }

    #[test]
    fn test_keypair_path_tilde_expanded() {
        let config = parse(&create_valid_config());
        // Only meaningful when the env override is absent
        if std::env::var("SOLANA_KEYPAIR_PATH").is_err() {
            let path = config.solana.get_keypair_path();
            assert!(!path.starts_with('~'));
            assert!(path.ends_with(".config/solana/id.json"));
        }
    }
}

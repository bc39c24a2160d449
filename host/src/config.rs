//! Host configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use ferry_elections::ElectionsConfig;
use ferry_oracle::SourceContracts;

use crate::logging::{init_logging, LogFormat};
use crate::HostError;

/// Configuration for a Ferry contract host.
///
/// Loaded from TOML via [`HostConfig::from_toml_file`] or built directly in
/// tests. Election tunables live under `[elections]`, source-chain contract
/// addresses under `[contracts]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Directory of the LMDB state database.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub elections: ElectionsConfig,

    #[serde(default)]
    pub contracts: SourceContracts,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./ferry_data")
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl HostConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| HostError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, HostError> {
        toml::from_str(s).map_err(|e| HostError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, HostError> {
        toml::to_string_pretty(self).map_err(|e| HostError::Config(e.to_string()))
    }

    pub fn log_format(&self) -> Result<LogFormat, HostError> {
        self.log_format.parse()
    }

    /// Install the global subscriber described by `log_format` and
    /// `log_level`.
    pub fn init_logging(&self) -> Result<(), HostError> {
        init_logging(self.log_format()?, &self.log_level)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            elections: ElectionsConfig::default(),
            contracts: SourceContracts::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_types::Address;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = HostConfig::from_toml_str("").unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.log_format().unwrap(), LogFormat::Human);
    }

    #[test]
    fn nested_tables_and_hex_addresses() {
        let config = HostConfig::from_toml_str(
            r#"
            data_dir = "/var/lib/ferry"
            log_format = "json"

            [elections]
            first_election_block = 100
            max_elected_validators = 5

            [contracts]
            bridge = "0x00000000000000000000000000000000000000b0"
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/ferry"));
        assert_eq!(config.log_format().unwrap(), LogFormat::Json);
        assert_eq!(config.elections.first_election_block, 100);
        assert_eq!(config.elections.max_elected_validators, 5);
        assert_eq!(config.elections.min_elected_validators, 7);
        let mut bridge = [0u8; 20];
        bridge[19] = 0xb0;
        assert_eq!(config.contracts.bridge, Address::new(bridge));
        assert!(config.contracts.token.is_zero());
    }

    #[test]
    fn toml_round_trip() {
        let mut config = HostConfig::default();
        config.contracts.voting = Address::new([7; 20]);
        config.elections.vote_out_weight_percent = 66;

        let text = config.to_toml_string().unwrap();
        assert_eq!(HostConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = HostConfig::from_toml_file("/nonexistent/ferry.toml").unwrap_err();
        assert!(matches!(err, HostError::Config(_)));
    }

    #[test]
    fn logging_is_installed_from_config_once() {
        let bad = HostConfig::from_toml_str("log_format = \"xml\"").unwrap();
        assert!(matches!(bad.init_logging(), Err(HostError::Config(_))));

        let config =
            HostConfig::from_toml_str("log_format = \"json\"\nlog_level = \"debug\"").unwrap();
        config.init_logging().unwrap();
        tracing::debug!("json subscriber installed");
        assert!(matches!(config.init_logging(), Err(HostError::Config(_))));
    }

    #[test]
    fn bad_address_is_rejected() {
        assert!(HostConfig::from_toml_str("[contracts]\ntoken = \"0x12\"").is_err());
    }
}

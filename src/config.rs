//! Configuration management for HashLedger

use crate::error::{LedgerError, Result};
use serde::Deserialize;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "hashledger.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_chain_path")]
    pub path: String,
    /// Write an empty chain document on startup when none exists.
    #[serde(default = "default_init_on_start")]
    pub init_on_start: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_chain_path(),
            init_on_start: default_init_on_start(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_api_port(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.storage.path.trim().is_empty() {
            return Err(LedgerError::Config(
                "storage.path must not be empty".to_string(),
            ));
        }
        if self.api.port == 0 {
            return Err(LedgerError::Config("api.port must be non-zero".to_string()));
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.api.bind, self.api.port)
            .parse()
            .map_err(|e| {
                LedgerError::Config(format!(
                    "invalid api address {}:{}: {}",
                    self.api.bind, self.api.port, e
                ))
            })
    }
}

/// Load `hashledger.toml` from the working directory.
pub fn load_config() -> Result<Config> {
    load_config_from(Path::new(DEFAULT_CONFIG_FILE))
}

/// Load and validate the config at `path`. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let config = match fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Config::default(),
        Err(e) => {
            return Err(LedgerError::Config(format!(
                "failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    config.validate()?;
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| LedgerError::Config(e.to_string()))
}

fn default_chain_path() -> String {
    "./data/blockchain.json".to_string()
}

fn default_init_on_start() -> bool {
    true
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    3000
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.storage.path, "./data/blockchain.json");
        assert!(config.storage.init_on_start);
        assert_eq!(config.api.port, 3000);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = parse_config(
            r#"
            [storage]
            path = "/var/lib/hashledger/chain.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.path, "/var/lib/hashledger/chain.json");
        assert!(config.storage.init_on_start);
        assert_eq!(config.api.bind, "127.0.0.1");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hashledger.toml");

        fs::write(&path, "[storage]\npath = \"\"\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(LedgerError::Config(_))));

        fs::write(&path, "[api]\nport = 0\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(LedgerError::Config(_))));

        fs::write(&path, "[api]\nbind = \"not an address\"\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(LedgerError::Config(_))));

        fs::write(&path, "storage = 5").unwrap();
        assert!(matches!(load_config_from(&path), Err(LedgerError::Config(_))));
    }
}

//! Settings for the local runner and log monitor.
//!
//! Read from `~/.yurei/config.toml` when present, or from an explicit path.
//! Every key is optional; missing keys keep their defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_LOG_CAPACITY, MAX_PAYLOAD_LEN};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Largest instruction payload accepted before aborting.
    pub max_payload_len: usize,
    /// Byte budget of the simulated log stream.
    pub log_capacity: usize,
    /// Program id used to attribute host log lines to the filter.
    pub program_id: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_payload_len: MAX_PAYLOAD_LEN,
            log_capacity: DEFAULT_LOG_CAPACITY,
            program_id: None,
        }
    }
}

impl RunnerConfig {
    /// `~/.yurei/config.toml`, if a home directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".yurei").join("config.toml"))
    }

    /// Load from `path`, or from [`default_path`](Self::default_path) when
    /// none is given. An explicit path must exist; a missing default file
    /// yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => {
                    tracing::debug!("no config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("invalid config")?;
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_payload_len > MAX_PAYLOAD_LEN {
            anyhow::bail!(
                "max_payload_len {} exceeds the host ceiling of {}",
                self.max_payload_len,
                MAX_PAYLOAD_LEN
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_host_limits() {
        let config = RunnerConfig::default();
        assert_eq!(config.max_payload_len, 10 * 1024);
        assert_eq!(config.log_capacity, 10_000);
        assert!(config.program_id.is_none());
    }

    #[test]
    fn empty_file_is_defaults() {
        assert_eq!(RunnerConfig::from_toml("").unwrap(), RunnerConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let config = RunnerConfig::from_toml("log_capacity = 64\n").unwrap();
        assert_eq!(config.log_capacity, 64);
        assert_eq!(config.max_payload_len, MAX_PAYLOAD_LEN);
    }

    #[test]
    fn program_id_is_read() {
        let config = RunnerConfig::from_toml("program_id = \"Yurei1111\"\n").unwrap();
        assert_eq!(config.program_id.as_deref(), Some("Yurei1111"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(RunnerConfig::from_toml("patterns = [\"ABC\"]\n").is_err());
    }

    #[test]
    fn payload_limit_above_host_ceiling_is_rejected() {
        let err = RunnerConfig::from_toml("max_payload_len = 20000\n").unwrap_err();
        assert!(err.to_string().contains("exceeds the host ceiling"));
    }

    #[test]
    fn cross_program_sized_limit_is_allowed() {
        let config = RunnerConfig::from_toml("max_payload_len = 4096\n").unwrap();
        assert_eq!(config.max_payload_len, 4096);
    }

    #[test]
    fn load_reads_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_payload_len = 16\n").unwrap();

        let config = RunnerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.max_payload_len, 16);
    }

    #[test]
    fn load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(RunnerConfig::load(Some(&path)).is_err());
    }
}

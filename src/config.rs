//! Configuration management with validation and defaults
//!
//! Loaded once at start-up from an optional TOML file, then overridden by
//! `TURNSTAKE_*` environment variables, then validated.

use crate::common::types::{amount_serde, Address, Amount};
use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Verification factory trusted to announce that verification started
pub const DEFAULT_FACTORY_ADDRESS: Address = Address::new([
    0x47, 0x53, 0xd5, 0x74, 0x68, 0x81, 0x90, 0x77, 0x64, 0xa7, 0x89, 0xdd, 0x67, 0xfd, 0x62,
    0xe3, 0x57, 0x38, 0x44, 0xea,
]);

/// 10 gwei, in wei
pub const DEFAULT_MINIMUM_STAKE: Amount = 10_000_000_000;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArenaConfig {
    pub stake: StakeConfig,
    pub matchmaking: MatchmakingConfig,
    pub verification: VerificationConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StakeConfig {
    /// Stake escrowed from each participant per game
    #[serde(with = "amount_serde")]
    pub minimum_stake: Amount,
    /// Unresolved games a player may hold at once; `None` leaves it to funds
    pub max_concurrent_games: Option<u32>,
}

impl Default for StakeConfig {
    fn default() -> Self {
        Self {
            minimum_stake: DEFAULT_MINIMUM_STAKE,
            max_concurrent_games: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MatchmakingConfig {
    pub min_players: usize,
}

impl Default for MatchmakingConfig {
    fn default() -> Self {
        Self { min_players: 2 }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VerificationConfig {
    pub factory_address: Address,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            factory_address: DEFAULT_FACTORY_ADDRESS,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MonitoringConfig {
    pub log_level: LogLevel,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ConfigurationError::InvalidValue {
                field: "monitoring.log_level".to_string(),
                value: s.to_string(),
                reason: "expected error|warn|info|debug|trace".to_string(),
            }),
        }
    }
}

impl ArenaConfig {
    /// Configuration used on the rollup node
    pub fn production() -> Self {
        Self::default()
    }

    /// Small stakes and a concurrent-game cap, for tests and local replays
    pub fn testing() -> Self {
        Self {
            stake: StakeConfig {
                minimum_stake: 10,
                max_concurrent_games: Some(4),
            },
            monitoring: MonitoringConfig {
                log_level: LogLevel::Debug,
            },
            ..Default::default()
        }
    }

    /// Validate configuration for logical consistency
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.stake.minimum_stake == 0 {
            return Err(ConfigurationError::ValidationFailed(
                "stake.minimum_stake must be > 0".to_string(),
            ));
        }

        if self.stake.max_concurrent_games == Some(0) {
            return Err(ConfigurationError::ValidationFailed(
                "stake.max_concurrent_games must be > 0 when set".to_string(),
            ));
        }

        if self.matchmaking.min_players != 2 {
            return Err(ConfigurationError::InvalidValue {
                field: "matchmaking.min_players".to_string(),
                value: self.matchmaking.min_players.to_string(),
                reason: "games are played by exactly two players".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> Result<ArenaConfig, ConfigurationError> {
        let mut config = match &self.config_path {
            Some(path) => Self::load_from_file(path)?,
            None => ArenaConfig::default(),
        };

        apply_overrides(&mut config, |key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<ArenaConfig, ConfigurationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(config: &ArenaConfig, path: P) -> Result<(), ConfigurationError> {
        let toml_string = toml::to_string_pretty(config).map_err(|e| {
            ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path.as_ref(), toml_string).map_err(|e| {
            ConfigurationError::SaveFailed(format!(
                "Failed to write to {}: {}",
                path.as_ref().display(),
                e
            ))
        })
    }
}

/// Apply `TURNSTAKE_*` overrides supplied by `lookup`
pub fn apply_overrides<F>(config: &mut ArenaConfig, lookup: F) -> Result<(), ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(stake) = lookup("TURNSTAKE_MINIMUM_STAKE") {
        config.stake.minimum_stake = stake.parse().map_err(|_| ConfigurationError::InvalidValue {
            field: "TURNSTAKE_MINIMUM_STAKE".to_string(),
            value: stake.clone(),
            reason: "Invalid amount".to_string(),
        })?;
    }

    if let Some(limit) = lookup("TURNSTAKE_MAX_CONCURRENT_GAMES") {
        config.stake.max_concurrent_games = if limit.is_empty() || limit == "none" {
            None
        } else {
            Some(limit.parse().map_err(|_| ConfigurationError::InvalidValue {
                field: "TURNSTAKE_MAX_CONCURRENT_GAMES".to_string(),
                value: limit.clone(),
                reason: "Invalid game count".to_string(),
            })?)
        };
    }

    if let Some(address) = lookup("TURNSTAKE_FACTORY_ADDRESS") {
        config.verification.factory_address =
            address.parse().map_err(|e| ConfigurationError::InvalidValue {
                field: "TURNSTAKE_FACTORY_ADDRESS".to_string(),
                value: address.clone(),
                reason: format!("{}", e),
            })?;
    }

    if let Some(level) = lookup("TURNSTAKE_LOG_LEVEL") {
        config.monitoring.log_level = level.parse()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = ArenaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stake.minimum_stake, 10_000_000_000);
        assert_eq!(
            config.verification.factory_address.to_string(),
            "0x4753d5746881907764a789dd67fd62e3573844ea"
        );
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(ArenaConfig::production().validate().is_ok());
        assert!(ArenaConfig::testing().validate().is_ok());
    }

    #[test]
    fn test_invalid_config_validation() {
        let mut config = ArenaConfig::default();
        config.stake.minimum_stake = 0;
        assert!(config.validate().is_err());

        let mut config = ArenaConfig::default();
        config.matchmaking.min_players = 3;
        assert!(config.validate().is_err());

        let mut config = ArenaConfig::default();
        config.stake.max_concurrent_games = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("TURNSTAKE_MINIMUM_STAKE", "25"),
            ("TURNSTAKE_MAX_CONCURRENT_GAMES", "3"),
            ("TURNSTAKE_FACTORY_ADDRESS", "0x0101010101010101010101010101010101010101"),
            ("TURNSTAKE_LOG_LEVEL", "TRACE"),
        ]);
        let mut config = ArenaConfig::default();

        apply_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.stake.minimum_stake, 25);
        assert_eq!(config.stake.max_concurrent_games, Some(3));
        assert_eq!(config.verification.factory_address, Address::from([1; 20]));
        assert_eq!(config.monitoring.log_level, LogLevel::Trace);
    }

    #[test]
    fn test_bad_override_is_reported() {
        let mut config = ArenaConfig::default();
        let err = apply_overrides(&mut config, |key| {
            (key == "TURNSTAKE_MINIMUM_STAKE").then(|| "lots".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("TURNSTAKE_MINIMUM_STAKE"));
    }

    #[test]
    fn test_save_and_load_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arena.toml");

        let config = ArenaConfig::testing();
        ConfigLoader::save(&config, &path).unwrap();

        let loaded = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arena.toml");
        std::fs::write(&path, "[stake]\nminimum_stake = 7\n").unwrap();

        let loaded = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(loaded.stake.minimum_stake, 7);
        assert_eq!(loaded.matchmaking.min_players, 2);
        assert_eq!(loaded.verification.factory_address, DEFAULT_FACTORY_ADDRESS);
    }

    #[test]
    fn test_missing_file_fails() {
        let err = ConfigLoader::new()
            .with_path("/nonexistent/turnstake.toml")
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::LoadFailed(_)));
    }
}

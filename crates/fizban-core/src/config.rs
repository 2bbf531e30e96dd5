//! Configuration loading and typed config structures for the Fizban backend.
//!
//! The configuration lives in `fizban-config.yaml` (or the file named by
//! `FIZBAN_CONFIG`). Every section and field has a default, so an empty
//! file, or no file at all, yields a working single-player setup on the
//! default starting map.
//!
//! After parsing, environment variables override individual fields:
//!
//! | Variable            | Field                        |
//! |---------------------|------------------------------|
//! | `FIZBAN_HOST`       | `server.host`                |
//! | `FIZBAN_PORT`       | `server.port`                |
//! | `FIZBAN_ADDONS`     | `addons.enabled`             |
//! | `FIZBAN_SNAPSHOT`   | `persistence.snapshot_path`  |
//! | `FIZBAN_LOG_FORMAT` | `logging.format`             |

use std::path::{Path, PathBuf};

use fizban_world::{GraphSpec, TravelGraph, WorldError, default_graph_spec};
use serde::Deserialize;

use crate::travel::DEFAULT_TRAVEL_LOG_CAPACITY;
use crate::world::World;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override holds an unusable value.
    #[error("invalid value {value:?} for {variable}")]
    InvalidOverride {
        /// Environment variable name.
        variable: &'static str,
        /// The rejected value.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level backend configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FizbanConfig {
    /// HTTP bind settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Built-in addon toggles.
    #[serde(default)]
    pub addons: AddonsConfig,

    /// Travel graph. The default starting map is used when absent.
    #[serde(default)]
    pub travel: Option<GraphSpec>,

    /// Travel log settings.
    #[serde(default)]
    pub travel_log: TravelLogConfig,

    /// Snapshot persistence.
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FizbanConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] for a bad environment value.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] for a bad environment value.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Override fields from environment variables.
    ///
    /// `lookup` resolves a variable name to its value; the binary passes
    /// the process environment, tests pass a fixed table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if `FIZBAN_PORT` is not a
    /// port number or `FIZBAN_LOG_FORMAT` is neither `pretty` nor `json`.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("FIZBAN_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("FIZBAN_PORT") {
            self.server.port = val.trim().parse().map_err(|_err| ConfigError::InvalidOverride {
                variable: "FIZBAN_PORT",
                value: val.clone(),
            })?;
        }
        if let Some(val) = lookup("FIZBAN_ADDONS") {
            self.addons.enabled = val;
        }
        if let Some(val) = lookup("FIZBAN_SNAPSHOT") {
            self.persistence.snapshot_path = (!val.trim().is_empty()).then(|| PathBuf::from(val));
        }
        if let Some(val) = lookup("FIZBAN_LOG_FORMAT") {
            self.logging.format = match val.trim().to_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidOverride {
                        variable: "FIZBAN_LOG_FORMAT",
                        value: val,
                    });
                }
            };
        }
        Ok(())
    }

    /// The configured travel graph description, or the default map.
    pub fn graph_spec(&self) -> GraphSpec {
        self.travel.clone().unwrap_or_else(default_graph_spec)
    }

    /// Build a fresh world from this configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`WorldError`] if the travel graph is inconsistent.
    pub fn build_world(&self) -> Result<World, WorldError> {
        let graph = TravelGraph::from_spec(&self.graph_spec())?;
        Ok(World::new(graph).with_travel_log_capacity(self.travel_log.capacity))
    }
}

/// HTTP bind settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Built-in addon toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddonsConfig {
    /// `""` for none, `all`, or a comma-separated list of addon names.
    #[serde(default)]
    pub enabled: String,
}

/// Travel log settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TravelLogConfig {
    /// Number of journeys kept in memory.
    #[serde(default = "default_travel_log_capacity")]
    pub capacity: usize,
}

impl Default for TravelLogConfig {
    fn default() -> Self {
        Self {
            capacity: default_travel_log_capacity(),
        }
    }
}

/// Snapshot persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersistenceConfig {
    /// JSON snapshot file. Persistence is off when unset.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

const fn default_port() -> u16 {
    8000
}

const fn default_travel_log_capacity() -> usize {
    DEFAULT_TRAVEL_LOG_CAPACITY
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let table: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| table.get(name).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = FizbanConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.travel_log.capacity, 200);
        assert!(config.addons.enabled.is_empty());
        assert!(config.persistence.snapshot_path.is_none());
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
server:
  host: 0.0.0.0
  port: 9100
addons:
  enabled: all
travel:
  tiers:
    gold: { title: Golden Arch, tag: boon }
  locations: [RainbowBridge, Whiterun]
  routes:
    - from: RainbowBridge
      to: [Whiterun]
      lanes: [gold]
      provider: rainbow_bridge
travel_log:
  capacity: 16
persistence:
  snapshot_path: /var/lib/fizban/world.json
logging:
  level: debug
  format: json
";
        let config: Option<FizbanConfig> = serde_yml::from_str(yaml).ok();
        let Some(config) = config else {
            panic!("full config should parse");
        };
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.addons.enabled, "all");
        assert_eq!(config.travel_log.capacity, 16);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.persistence.snapshot_path,
            Some(PathBuf::from("/var/lib/fizban/world.json"))
        );

        let world = config.build_world().ok();
        assert_eq!(world.map(|w| w.graph().lane_count()), Some(1));
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config: Option<FizbanConfig> = serde_yml::from_str("{}").ok();
        assert_eq!(config, Some(FizbanConfig::default()));
    }

    #[test]
    fn missing_travel_section_uses_starting_map() {
        let world = FizbanConfig::default().build_world().ok();
        assert_eq!(world.map(|w| w.graph().location_count()), Some(7));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = FizbanConfig::default();
        let result = config.apply_env_overrides(env(&[
            ("FIZBAN_HOST", "0.0.0.0"),
            ("FIZBAN_PORT", "8123"),
            ("FIZBAN_ADDONS", "example_ping,realm_lorkhan"),
            ("FIZBAN_SNAPSHOT", "world.json"),
            ("FIZBAN_LOG_FORMAT", "JSON"),
        ]));
        assert!(result.is_ok());
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.addons.enabled, "example_ping,realm_lorkhan");
        assert_eq!(config.persistence.snapshot_path, Some(PathBuf::from("world.json")));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn blank_snapshot_override_disables_persistence() {
        let mut config = FizbanConfig::default();
        config.persistence.snapshot_path = Some(PathBuf::from("world.json"));
        assert!(config.apply_env_overrides(env(&[("FIZBAN_SNAPSHOT", "")])).is_ok());
        assert!(config.persistence.snapshot_path.is_none());
    }

    #[test]
    fn bad_port_override_rejected() {
        let mut config = FizbanConfig::default();
        let err = config.apply_env_overrides(env(&[("FIZBAN_PORT", "eighty")]));
        assert!(matches!(
            err,
            Err(ConfigError::InvalidOverride {
                variable: "FIZBAN_PORT",
                ..
            })
        ));
    }

    #[test]
    fn bad_travel_section_fails_world_build() {
        let yaml = r"
travel:
  locations: [RainbowBridge]
  routes:
    - from: RainbowBridge
      to: [Sovngarde]
      lanes: [gold]
";
        let config: Option<FizbanConfig> = serde_yml::from_str(yaml).ok();
        assert!(config.is_some_and(|c| c.build_world().is_err()));
    }
}

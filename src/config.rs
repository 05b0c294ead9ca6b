//! Layered configuration: built-in defaults, then a TOML file, then
//! `QUORIDOR_*` environment variables. Command-line flags are applied on top
//! by the binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::mcts::MctsConfig;

/// Variable naming an explicit configuration file.
pub const CONFIG_PATH_VAR: &str = "QUORIDOR_CONFIG";

/// Locations searched when no explicit file is given.
pub const CONFIG_SEARCH_PATHS: &[&str] = &["quoridor.toml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub mcts: MctsConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON snapshot of the statistics store, loaded at startup and written
    /// on exit.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            mcts: MctsConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

/// Loads the configuration from `QUORIDOR_CONFIG` or the search paths and
/// applies environment overrides. Unreadable files are logged and replaced by
/// defaults.
pub fn load_config() -> AppConfig {
    load_config_with(|key| std::env::var(key).ok())
}

/// [`load_config`] with environment variables read through `lookup`.
pub fn load_config_with<F>(lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    let explicit = lookup(CONFIG_PATH_VAR).map(PathBuf::from);
    if let Some(path) = &explicit {
        if !path.exists() {
            warn!(
                "{}={} not found, searching defaults",
                CONFIG_PATH_VAR,
                path.display()
            );
        }
    }
    let found = explicit
        .filter(|path| path.exists())
        .or_else(|| {
            CONFIG_SEARCH_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|path| path.exists())
        });

    let config = match found {
        Some(path) => {
            info!("Loading config from {}", path.display());
            load_from_path(&path).unwrap_or_else(|err| {
                warn!("{err}, using defaults");
                AppConfig::default()
            })
        }
        None => {
            debug!("No quoridor.toml found, using built-in defaults");
            AppConfig::default()
        }
    };
    apply_env_overrides(config, lookup)
}

/// Parses a TOML file; absent keys keep their defaults.
pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

macro_rules! env_override {
    // String field
    ($lookup:expr, $target:expr, $key:expr) => {
        if let Some(v) = $lookup($key) {
            $target = v;
        }
    };
    // Parseable field
    ($lookup:expr, $target:expr, $key:expr, parse) => {
        match $lookup($key).map(|s| s.parse()) {
            Some(Ok(v)) => $target = v,
            Some(Err(_)) => warn!("ignoring unparsable {}", $key),
            None => {}
        }
    };
    // Optional parseable field
    ($lookup:expr, $target:expr, $key:expr, optional_parse) => {
        match $lookup($key).map(|s| s.parse()) {
            Some(Ok(v)) => $target = Some(v),
            Some(Err(_)) => warn!("ignoring unparsable {}", $key),
            None => {}
        }
    };
}

/// Applies `QUORIDOR_<SECTION>_<KEY>` overrides read through `lookup`.
pub fn apply_env_overrides<F>(mut config: AppConfig, lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    env_override!(lookup, config.log_level, "QUORIDOR_LOG_LEVEL");

    env_override!(
        lookup,
        config.mcts.exploration,
        "QUORIDOR_MCTS_EXPLORATION",
        parse
    );
    env_override!(lookup, config.mcts.agent, "QUORIDOR_MCTS_AGENT", parse);
    env_override!(
        lookup,
        config.mcts.num_passes,
        "QUORIDOR_MCTS_NUM_PASSES",
        parse
    );
    env_override!(
        lookup,
        config.mcts.max_simulation_depth,
        "QUORIDOR_MCTS_MAX_SIMULATION_DEPTH",
        parse
    );

    env_override!(
        lookup,
        config.store.snapshot_path,
        "QUORIDOR_STORE_SNAPSHOT_PATH",
        optional_parse
    );
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::Player;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.mcts, MctsConfig::default());
        assert_eq!(config.store.snapshot_path, None);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "log_level = \"debug\"\n\n[mcts]\nnum_passes = 10\n\n[store]\nsnapshot_path = \"stats.json\""
        )
        .unwrap();
        let config = load_from_path(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.mcts.num_passes, 10);
        assert_eq!(config.mcts.max_simulation_depth, 200);
        assert_eq!(config.store.snapshot_path, Some(PathBuf::from("stats.json")));
    }

    #[test]
    fn broken_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[mcts\nnum_passes = ").unwrap();
        assert!(matches!(
            load_from_path(file.path()),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            load_from_path(Path::new("/definitely/not/here.toml")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn unreadable_explicit_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = ").unwrap();
        let path = file.path().display().to_string();
        let config = load_config_with(env(&[
            (CONFIG_PATH_VAR, path.as_str()),
            ("QUORIDOR_MCTS_NUM_PASSES", "3"),
        ]));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.mcts.num_passes, 3);
    }

    #[test]
    fn env_overrides_win() {
        let config = apply_env_overrides(
            AppConfig::default(),
            env(&[
                ("QUORIDOR_LOG_LEVEL", "trace"),
                ("QUORIDOR_MCTS_AGENT", "player1"),
                ("QUORIDOR_MCTS_NUM_PASSES", "0"),
                ("QUORIDOR_MCTS_EXPLORATION", "0.5"),
                ("QUORIDOR_STORE_SNAPSHOT_PATH", "/tmp/q.json"),
            ]),
        );
        assert_eq!(config.log_level, "trace");
        assert_eq!(config.mcts.agent, Player::Player1);
        assert_eq!(config.mcts.num_passes, 0);
        assert_eq!(config.mcts.exploration, 0.5);
        assert_eq!(
            config.store.snapshot_path,
            Some(PathBuf::from("/tmp/q.json"))
        );
    }

    #[test]
    fn unparsable_override_is_ignored() {
        let config = apply_env_overrides(
            AppConfig::default(),
            env(&[("QUORIDOR_MCTS_MAX_SIMULATION_DEPTH", "deep")]),
        );
        assert_eq!(config.mcts.max_simulation_depth, 200);
    }
}

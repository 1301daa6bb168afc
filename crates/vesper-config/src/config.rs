//! Settings structs and their RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub batch: BatchConfig,
    pub profiler: ProfilerConfig,
    pub debug: DebugConfig,
}

/// Accessor sizing for the UI batcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BatchConfig {
    /// Vertices reserved by a fresh accessor.
    pub initial_vertex_capacity: u32,
    /// Indices reserved by a fresh accessor.
    pub initial_index_capacity: u32,
    /// Hard vertex limit per accessor. Values above 65536 are clamped, since
    /// indices are 16 bit.
    pub max_vertices_per_accessor: u32,
}

/// Performance counter settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Rolling average window in milliseconds.
    pub average_window_ms: f64,
}

/// Development settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Filter directive, e.g. `"info"` or `"debug,vesper_render=trace"`.
    pub log_level: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            initial_vertex_capacity: 1024,
            initial_index_capacity: 1536,
            max_vertices_per_accessor: 65536,
        }
    }
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            average_window_ms: 500.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn path_in(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE_NAME)
    }

    /// Load `config.ron` from `config_dir`, writing the defaults there first if it is missing.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = Self::path_in(config_dir);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Write this config to `config_dir/config.ron`, creating the directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(Self::path_in(config_dir), serialized).map_err(ConfigError::WriteError)
    }

    /// Re-read the file. `Some` only when it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read(&Self::path_in(config_dir))?;
        if &fresh != self {
            log::info!("Config reloaded with changes");
            Ok(Some(fresh))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_serialize_readably() {
        let ron_str =
            ron::ser::to_string_pretty(&Config::default(), ron::ser::PrettyConfig::new()).unwrap();
        assert!(ron_str.contains("initial_vertex_capacity: 1024"));
        assert!(ron_str.contains("average_window_ms: 500.0"));
        assert!(ron_str.contains("log_level: \"info\""));
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let config: Config = ron::from_str("(batch: (max_vertices_per_accessor: 4096))").unwrap();
        assert_eq!(config.batch.max_vertices_per_accessor, 4096);
        assert_eq!(config.batch.initial_vertex_capacity, 1024);
        assert_eq!(config.profiler, ProfilerConfig::default());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let result: Result<Config, _> = ron::from_str("(shadow_quality: 3)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_comments_allowed() {
        let config: Config = ron::from_str("// batcher\n(\n  // nothing set\n)").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(Config::path_in(dir.path()), "(batch: [oops").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("vesper");
        let config = Config::load_or_create(&nested).unwrap();
        assert_eq!(config, Config::default());
        assert!(Config::path_in(&nested).exists());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.batch.initial_vertex_capacity = 256;
        config.debug.log_level = "debug,vesper_render=trace".to_string();

        config.save(dir.path()).unwrap();
        assert_eq!(Config::load_or_create(dir.path()).unwrap(), config);
    }

    #[test]
    fn test_reload_reports_only_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut edited = config.clone();
        edited.profiler.average_window_ms = 250.0;
        edited.save(dir.path()).unwrap();

        let reloaded = config.reload(dir.path()).unwrap().unwrap();
        assert_eq!(reloaded.profiler.average_window_ms, 250.0);
    }

    #[test]
    fn test_reload_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::default().reload(dir.path()),
            Err(ConfigError::ReadError(_))
        ));
    }
}

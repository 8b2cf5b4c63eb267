// ABOUTME: Configuration management for the promptweave CLI
// ABOUTME: Loads promptweave.yaml and applies environment variable overrides

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::output::OutputSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,

    #[serde(default)]
    pub output: OutputSettings,

    /// Whole-word replacements applied before parsing, in file order.
    #[serde(default)]
    pub substitutions: IndexMap<String, String>,

    /// Values served by the `config` variable type.
    #[serde(default)]
    pub variables: HashMap<String, String>,

    /// Shell commands served by the `command` variable type.
    #[serde(default)]
    pub commands: HashMap<String, String>,

    #[serde(default)]
    pub placeholder_timeout_secs: Option<u64>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_project_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            output: OutputSettings::default(),
            substitutions: IndexMap::new(),
            variables: HashMap::new(),
            commands: HashMap::new(),
            placeholder_timeout_secs: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::find_config_file(),
        };

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config {}", config_path.display()))?;
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid config {}", config_path.display()))?
        } else {
            Config::default()
        };

        config.merge_env_from(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> PathBuf {
        let possible_paths = [
            PathBuf::from("promptweave.yaml"),
            PathBuf::from("promptweave.yml"),
            PathBuf::from(".promptweave.yaml"),
            PathBuf::from(".promptweave.yml"),
        ];

        for path in possible_paths {
            if path.exists() {
                return path;
            }
        }

        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".promptweave").join("config.yaml");
            if home_config.exists() {
                return home_config;
            }
        }

        // Default path (may not exist)
        PathBuf::from("promptweave.yaml")
    }

    /// Apply `PROMPTWEAVE_*` overrides using `lookup` for variable access.
    pub fn merge_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("PROMPTWEAVE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("PROMPTWEAVE_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(dir) = lookup("PROMPTWEAVE_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }
    }

    /// Configured substitutions followed by `extra`; command-line values win.
    pub fn merged_substitutions(
        &self,
        extra: IndexMap<String, String>,
    ) -> IndexMap<String, String> {
        let mut merged = self.substitutions.clone();
        merged.extend(extra);
        merged
    }
}

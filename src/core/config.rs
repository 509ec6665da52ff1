//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::api::DEFAULT_TIMEOUT;

/// Project-local config file, relative to the working directory
pub const PROJECT_CONFIG: &str = ".ctk/config.yaml";

/// CTK configuration with layered hierarchy
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the contacts API (e.g. https://crm.example.com/api)
    pub api_url: Option<String>,

    /// Bearer token sent with every request
    pub api_token: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Contacts created in parallel during import
    pub concurrency: Option<usize>,

    /// Directory export files and templates are written to
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Global user config (~/.config/ctk/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 2. Project config (./.ctk/config.yaml)
        if let Some(project) = Self::read_file(Path::new(PROJECT_CONFIG)) {
            config.merge(project);
        }

        // 3. Environment variables
        config.merge(Self::from_env(|name| std::env::var(name).ok()));

        config
    }

    /// Read one YAML layer, ignoring missing or malformed files
    pub fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    /// Build the environment layer from a variable lookup
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Config {
        Config {
            api_url: lookup("CTK_API_URL"),
            api_token: lookup("CTK_API_TOKEN"),
            timeout_secs: lookup("CTK_TIMEOUT_SECS").and_then(|v| v.parse().ok()),
            concurrency: lookup("CTK_CONCURRENCY").and_then(|v| v.parse().ok()),
            output_dir: lookup("CTK_OUTPUT_DIR").map(PathBuf::from),
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "ctk")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.api_token.is_some() {
            self.api_token = other.api_token;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.concurrency.is_some() {
            self.concurrency = other.concurrency;
        }
        if other.output_dir.is_some() {
            self.output_dir = other.output_dir;
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Import parallelism, at least 1
    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(1).max(1)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

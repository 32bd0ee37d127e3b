use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "blog.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// How the home page orders posts by their `date` field.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateOrder {
    /// Plain string comparison of the displayed dates.
    #[default]
    Lexical,
    /// Parse both known date formats and compare timestamps.
    Chronological,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub owner_name: String,
    pub posts_endpoint: String,
    pub port: u16,
    pub development: bool,
    /// Seconds before the remote fetch gives up; 0 waits forever.
    pub fetch_timeout_secs: u64,
    pub date_order: DateOrder,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner_name: "Gavin \"Siris\" Martin".to_string(),
            posts_endpoint: "https://api.npoint.io/e52811763db21dfef489".to_string(),
            port: 8080,
            development: true,
            fetch_timeout_secs: 10,
            date_order: DateOrder::Lexical,
            templates_dir: PathBuf::from("templates"),
            static_dir: PathBuf::from("static"),
        }
    }
}

impl Config {
    /// Reads `BLOG_CONFIG` (or `blog.toml` when present), then applies the
    /// `PORT` and `RUST_ENV` environment overrides. Any `RUST_ENV` other than
    /// `production` keeps development mode on.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("BLOG_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => Self::default(),
        };

        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        if let Ok(env) = std::env::var("RUST_ENV") {
            config.apply_rust_env(&env);
        }
        Ok(config)
    }

    fn apply_rust_env(&mut self, env: &str) {
        self.development = env != "production";
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_secs > 0).then(|| Duration::from_secs(self.fetch_timeout_secs))
    }
}

//! Configuration management for notesync.
//!
//! This module handles loading and saving client configuration to/from
//! a JSON file. The config directory can be customized.
//!
//! The API base path may additionally be overridden from the environment
//! (`NOTES_API_BASE`); the override is never written back to disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::normalize_base;
use crate::error::{NotesError, NotesResult};

/// Environment variable that overrides the configured API base.
pub const API_BASE_ENV: &str = "NOTES_API_BASE";

fn default_server_origin() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_base() -> String {
    "/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Client configuration for reaching the Notes Store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Origin that relative API bases are resolved against
    #[serde(default = "default_server_origin")]
    pub server_origin: String,
    /// API base path, relative (`/api`) or absolute (`https://host/api`)
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Environment-supplied base, takes precedence over `api_base`
    #[serde(skip)]
    pub api_base_override: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_origin: default_server_origin(),
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout_secs(),
            api_base_override: None,
        }
    }
}

impl ClientConfig {
    /// Client configuration pointing at an explicit base URL
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            api_base: base_url.to_string(),
            ..Default::default()
        }
    }

    /// Read `NOTES_API_BASE` from the process environment
    pub fn apply_env(&mut self) {
        let value = std::env::var(API_BASE_ENV).ok();
        self.apply_api_base_override(value.as_deref());
    }

    /// Set the base override; blank values are ignored
    pub fn apply_api_base_override(&mut self, value: Option<&str>) {
        self.api_base_override = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
    }

    /// Fully resolved base URL, without a trailing slash
    pub fn base_url(&self) -> String {
        let configured = self
            .api_base_override
            .as_deref()
            .unwrap_or(self.api_base.as_str());
        let base = normalize_base(configured);

        if base.starts_with("http://") || base.starts_with("https://") {
            base
        } else {
            let origin = normalize_base(&self.server_origin);
            if base.is_empty() || base.starts_with('/') {
                format!("{}{}", origin, base)
            } else {
                format!("{}/{}", origin, base)
            }
        }
    }
}

/// Configuration manager
pub struct Config {
    config_dir: PathBuf,
    config_file: PathBuf,
    data: ClientConfig,
}

impl Config {
    /// Create a new configuration manager
    ///
    /// Without the `desktop` feature, `config_dir` is required.
    pub fn new(config_dir: Option<PathBuf>) -> NotesResult<Self> {
        let config_dir = match config_dir {
            Some(dir) => dir,
            None => {
                #[cfg(feature = "desktop")]
                {
                    dirs::config_dir()
                        .unwrap_or_else(|| PathBuf::from("."))
                        .join("notesync")
                }
                #[cfg(not(feature = "desktop"))]
                {
                    return Err(NotesError::Config(
                        "config_dir is required without the desktop feature".to_string(),
                    ));
                }
            }
        };

        fs::create_dir_all(&config_dir)?;
        let config_file = config_dir.join("config.json");

        let mut data = if config_file.exists() {
            match fs::read_to_string(&config_file) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    tracing::warn!("Ignoring unreadable config {}: {}", config_file.display(), e);
                    ClientConfig::default()
                }),
                Err(_) => ClientConfig::default(),
            }
        } else {
            ClientConfig::default()
        };
        data.apply_env();

        let config = Self {
            config_dir,
            config_file,
            data,
        };

        // Save default config if it doesn't exist
        if !config.config_file.exists() {
            config.save()?;
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> NotesResult<()> {
        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.config_file, content)?;
        Ok(())
    }

    /// Get the configuration directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Client settings used to build a store adapter
    pub fn client(&self) -> &ClientConfig {
        &self.data
    }

    pub fn base_url(&self) -> String {
        self.data.base_url()
    }

    /// Get a config value by key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "server_origin" => Some(self.data.server_origin.clone()),
            "api_base" => Some(self.data.api_base.clone()),
            "request_timeout_secs" => Some(self.data.request_timeout_secs.to_string()),
            _ => None,
        }
    }

    /// Set a config value by key and persist it
    pub fn set(&mut self, key: &str, value: &str) -> NotesResult<()> {
        match key {
            "server_origin" => self.data.server_origin = value.to_string(),
            "api_base" => self.data.api_base = value.to_string(),
            "request_timeout_secs" => {
                self.data.request_timeout_secs = value.parse().map_err(|_| {
                    NotesError::Config(format!("request_timeout_secs must be a number: {}", value))
                })?;
            }
            _ => return Err(NotesError::Config(format!("Unknown config key: {}", key))),
        }
        self.save()
    }
}

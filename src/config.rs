//! Configuration loading with layered overrides.
//!
//! Config is loaded in order (each layer overrides the previous):
//! 1. Default values
//! 2. Config file (TOML)
//! 3. Environment variables
//! 4. CLI arguments

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::resolver::DEFAULT_MAX_DEPTH;

/// Resolver configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub access: Access,
}

/// Database connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data.db".to_string()
}

/// Access resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Access {
    /// How many ancestors the inheritance walk may visit.
    #[serde(default = "default_max_inheritance_depth")]
    pub max_inheritance_depth: u32,

    /// Deepest a project tree may grow; 2 means top-level plus one level of subprojects.
    #[serde(default = "default_max_project_depth")]
    pub max_project_depth: u32,
}

impl Default for Access {
    fn default() -> Self {
        Self {
            max_inheritance_depth: default_max_inheritance_depth(),
            max_project_depth: default_max_project_depth(),
        }
    }
}

fn default_max_inheritance_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

fn default_max_project_depth() -> u32 {
    2
}

/// Builder for loading configuration with customizable options.
#[derive(Debug, Clone)]
pub struct Loader {
    /// Environment variable prefix (e.g., "MYAPP" -> MYAPP_MAX_PROJECT_DEPTH)
    pub env_prefix: String,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            env_prefix: "WARDEN".to_string(),
        }
    }
}

impl Loader {
    /// Create a new config loader with the given environment prefix.
    pub fn new(env_prefix: impl Into<String>) -> Self {
        Self {
            env_prefix: env_prefix.into(),
        }
    }

    /// Load configuration from file, environment, and CLI arguments.
    ///
    /// # Arguments
    /// * `config_path` - Optional path to TOML config file
    /// * `cli_database_url` - CLI override for database URL
    /// * `cli_max_inheritance_depth` - CLI override for the inheritance walk limit
    pub fn load(
        &self,
        config_path: Option<&Path>,
        cli_database_url: Option<&str>,
        cli_max_inheritance_depth: Option<u32>,
    ) -> crate::Result<Config> {
        let mut config: Config = if let Some(path) = config_path {
            let content = std::fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;
            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?
        } else {
            Config::default()
        };

        let prefix = &self.env_prefix;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = url;
        }
        if let Ok(depth) = std::env::var(format!("{prefix}_MAX_INHERITANCE_DEPTH")) {
            config.access.max_inheritance_depth =
                parse_depth(prefix, "MAX_INHERITANCE_DEPTH", &depth)?;
        }
        if let Ok(depth) = std::env::var(format!("{prefix}_MAX_PROJECT_DEPTH")) {
            config.access.max_project_depth = parse_depth(prefix, "MAX_PROJECT_DEPTH", &depth)?;
        }

        if let Some(url) = cli_database_url {
            config.database.url = url.to_string();
        }
        if let Some(depth) = cli_max_inheritance_depth {
            config.access.max_inheritance_depth = depth;
        }

        if config.access.max_inheritance_depth == 0 {
            return Err(Error::Config(
                "max_inheritance_depth must be at least 1".to_string(),
            ));
        }
        if config.access.max_project_depth == 0 {
            return Err(Error::Config(
                "max_project_depth must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }
}

fn parse_depth(prefix: &str, name: &str, value: &str) -> crate::Result<u32> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("{prefix}_{name} must be a number, got {value:?}")))
}

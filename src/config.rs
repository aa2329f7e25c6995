// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::model::category::{CategoryRule, CategoryRules};
use crate::planner::{DEFAULT_DURATION, DEFAULT_MAX_DAYS, ResponseFormat};
use crate::storage::LocalStorage;
use anyhow::{Error, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_api_key_env() -> String {
    "GOOGLE_GENAI_API_KEY".to_string()
}

fn default_max_days() -> u32 {
    DEFAULT_MAX_DAYS
}
fn default_duration() -> u32 {
    DEFAULT_DURATION
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_user() -> String {
    "local".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the generator API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_max_days")]
    pub max_days: u32,
    #[serde(default = "default_duration")]
    pub default_duration: u32,
    #[serde(default)]
    pub response_format: ResponseFormat,

    #[serde(default = "default_user")]
    pub default_user: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Empty means the built-in keyword rules.
    #[serde(default)]
    pub category_rules: Vec<CategoryRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_days: DEFAULT_MAX_DAYS,
            default_duration: DEFAULT_DURATION,
            response_format: ResponseFormat::default(),
            default_user: default_user(),
            log_level: default_log_level(),
            category_rules: Vec::new(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(config) => Ok(config),
            Err(e) if Self::is_missing_config_error(&e) => {
                log::debug!("No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Detects whether an error from `load` means the config file was missing,
    /// either from our explicit message or an IO NotFound anywhere in the chain.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    pub fn category_rules(&self) -> CategoryRules {
        if self.category_rules.is_empty() {
            CategoryRules::default()
        } else {
            CategoryRules::new(self.category_rules.clone())
        }
    }

    pub fn log_level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

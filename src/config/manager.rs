use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::paths;

pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";
pub const DEFAULT_TARGET_LANGUAGE: &str = "cs";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(86400);

/// Default settings in the `[potrans]` section of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PotransConfig {
    /// Default source language (ISO 639-1 code).
    pub from: Option<String>,
    /// Default target language.
    pub to: Option<String>,
    /// Default pause after each backend call, in milliseconds.
    pub wait: Option<u64>,
    /// Cache record lifetime, in seconds.
    pub cache_ttl: Option<u64>,
}

/// Settings for an API-backed translation service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// API key stored directly in config (not recommended).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable name containing the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Override for the service endpoint URL.
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl ServiceConfig {
    /// Gets the API key, preferring environment variable over config file.
    ///
    /// `default_env` is consulted when `api_key_env` is not set.
    pub fn get_api_key(&self, default_env: &str) -> Option<String> {
        let env_var = self.api_key_env.as_deref().unwrap_or(default_env);
        if let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Some(key);
        }
        self.api_key.clone()
    }
}

/// Settings in the `[deepl]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeepLConfig {
    #[serde(flatten)]
    pub service: ServiceConfig,
    /// Regex matching substrings the service must leave untranslated.
    #[serde(default)]
    pub preserve: Option<String>,
}

/// Settings in the `[script]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptConfig {
    /// Default translator program.
    pub command: Option<PathBuf>,
    /// Extra arguments placed before the language pair.
    #[serde(default)]
    pub args: Vec<String>,
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/potrans/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Default settings.
    #[serde(default)]
    pub potrans: PotransConfig,
    /// Google Translate settings.
    #[serde(default)]
    pub google: ServiceConfig,
    /// DeepL settings.
    #[serde(default)]
    pub deepl: DeepLConfig,
    /// Custom translator script settings.
    #[serde(default)]
    pub script: ScriptConfig,
}

/// CLI overrides that take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub from: Option<String>,
    pub to: Option<String>,
    /// Milliseconds.
    pub wait: Option<u64>,
    /// Seconds.
    pub cache_ttl: Option<u64>,
}

/// Run settings after merging CLI arguments, config file, and built-in
/// defaults.
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    pub from: String,
    pub to: String,
    /// `None` when throttling is off.
    pub wait: Option<Duration>,
    pub cache_ttl: Duration,
}

/// Merges CLI options with config file settings.
///
/// CLI options win; every field has a built-in default, so resolution
/// cannot fail. A wait of zero milliseconds means no throttling.
pub fn resolve_run(options: &ResolveOptions, config_file: &ConfigFile) -> ResolvedRun {
    let from = options
        .from
        .clone()
        .or_else(|| config_file.potrans.from.clone())
        .unwrap_or_else(|| DEFAULT_SOURCE_LANGUAGE.to_string());

    let to = options
        .to
        .clone()
        .or_else(|| config_file.potrans.to.clone())
        .unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.to_string());

    let wait = options
        .wait
        .or(config_file.potrans.wait)
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis);

    let cache_ttl = options
        .cache_ttl
        .or(config_file.potrans.cache_ttl)
        .map_or(DEFAULT_CACHE_TTL, Duration::from_secs);

    ResolvedRun {
        from,
        to,
        wait,
        cache_ttl,
    }
}

/// Picks an API key from the CLI flag, the environment, or the config
/// file, in that order.
pub fn require_api_key(
    cli_key: Option<String>,
    service: &ServiceConfig,
    service_name: &str,
    default_env: &str,
) -> Result<String> {
    if let Some(key) = cli_key.filter(|k| !k.is_empty()) {
        return Ok(key);
    }

    service.get_api_key(default_env).ok_or_else(|| {
        anyhow!(
            "Missing API key for {service_name}\n\n\
             Please provide it via:\n  \
             - CLI option: --api-key <key>\n  \
             - Environment variable: export {default_env}=\"your-api-key\"\n  \
             - Config file: ~/.config/potrans/config.toml"
        )
    })
}

/// Manages loading the configuration file.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager.
    ///
    /// Configuration is read from `$XDG_CONFIG_HOME/potrans/config.toml`
    /// or `~/.config/potrans/config.toml` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        let config_file: ConfigFile =
            toml::from_str(&contents).with_context(|| "Failed to parse config file")?;

        Ok(config_file)
    }

    /// Loads the config file, falling back to defaults when it does not
    /// exist or cannot be parsed.
    pub fn load_or_default(&self) -> ConfigFile {
        self.load().unwrap_or_default()
    }
}

//! Configuration file handling.

mod manager;

pub use manager::{
    ConfigFile, ConfigManager, DEFAULT_CACHE_TTL, DEFAULT_SOURCE_LANGUAGE,
    DEFAULT_TARGET_LANGUAGE, DeepLConfig, PotransConfig, ResolveOptions, ResolvedRun,
    ScriptConfig, ServiceConfig, require_api_key, resolve_run,
};

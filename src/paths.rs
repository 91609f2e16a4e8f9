//! XDG-style path resolution for configuration and cache files.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Returns the configuration directory for potrans.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/potrans` if `XDG_CONFIG_HOME` is set
/// 2. `~/.config/potrans` otherwise
pub fn config_dir() -> Result<PathBuf> {
    match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => Ok(PathBuf::from(xdg).join("potrans")),
        Err(_) => Ok(home_dir()?.join(".config").join("potrans")),
    }
}

/// Returns the cache directory for potrans.
///
/// Resolution order:
/// 1. `$XDG_CACHE_HOME/potrans` if `XDG_CACHE_HOME` is set
/// 2. `~/.cache/potrans` otherwise
pub fn cache_dir() -> Result<PathBuf> {
    match std::env::var("XDG_CACHE_HOME") {
        Ok(xdg) => Ok(PathBuf::from(xdg).join("potrans")),
        Err(_) => Ok(home_dir()?.join(".cache").join("potrans")),
    }
}

/// Path of the SQLite translation cache database.
pub fn cache_db_path() -> Result<PathBuf> {
    Ok(cache_dir()?.join("translations.db"))
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("Failed to determine home directory")
}

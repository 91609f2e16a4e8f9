#![allow(clippy::unwrap_used)]
//! Config priority contract tests.
//!
//! These tests verify that CLI options take priority over config file
//! settings. Priority order (highest to lowest):
//! 1. CLI arguments
//! 2. Config file defaults
//! 3. Built-in defaults

use std::time::Duration;

use potrans_cli::config::{
    ConfigFile, DEFAULT_CACHE_TTL, PotransConfig, ResolveOptions, ScriptConfig, ServiceConfig,
    require_api_key, resolve_run,
};

fn make_config_with_defaults() -> ConfigFile {
    ConfigFile {
        potrans: PotransConfig {
            from: Some("de".to_string()),
            to: Some("fr".to_string()),
            wait: Some(100),
            cache_ttl: Some(600),
        },
        google: ServiceConfig {
            api_key: Some("config-google-key".to_string()),
            ..ServiceConfig::default()
        },
        script: ScriptConfig {
            command: Some("/usr/local/bin/translate".into()),
            args: vec!["--model".to_string(), "base".to_string()],
        },
        ..ConfigFile::default()
    }
}

#[test]
fn test_cli_languages_override_config_languages() {
    let config = make_config_with_defaults();
    let options = ResolveOptions {
        from: Some("en".to_string()),
        to: Some("cs".to_string()),
        ..ResolveOptions::default()
    };

    let resolved = resolve_run(&options, &config);

    // CLI languages should override config
    assert_eq!(resolved.from, "en");
    assert_eq!(resolved.to, "cs");
}

#[test]
fn test_config_languages_used_when_cli_not_specified() {
    let config = make_config_with_defaults();

    let resolved = resolve_run(&ResolveOptions::default(), &config);

    assert_eq!(resolved.from, "de");
    assert_eq!(resolved.to, "fr");
    assert_eq!(resolved.wait, Some(Duration::from_millis(100)));
    assert_eq!(resolved.cache_ttl, Duration::from_secs(600));
}

#[test]
fn test_built_in_defaults_used_when_nothing_specified() {
    let resolved = resolve_run(&ResolveOptions::default(), &ConfigFile::default());

    assert_eq!(resolved.from, "en");
    assert_eq!(resolved.to, "cs");
    assert_eq!(resolved.wait, None);
    assert_eq!(resolved.cache_ttl, DEFAULT_CACHE_TTL);
}

#[test]
fn test_cli_wait_overrides_config_wait() {
    let config = make_config_with_defaults();
    let options = ResolveOptions {
        wait: Some(250),
        ..ResolveOptions::default()
    };

    let resolved = resolve_run(&options, &config);

    assert_eq!(resolved.wait, Some(Duration::from_millis(250)));
}

#[test]
fn test_cli_wait_zero_disables_config_wait() {
    // --wait 0 turns throttling off even when the config file sets a pause
    let config = make_config_with_defaults();
    let options = ResolveOptions {
        wait: Some(0),
        ..ResolveOptions::default()
    };

    let resolved = resolve_run(&options, &config);

    assert_eq!(resolved.wait, None);
}

#[test]
fn test_cli_cache_ttl_overrides_config_cache_ttl() {
    let config = make_config_with_defaults();
    let options = ResolveOptions {
        cache_ttl: Some(5),
        ..ResolveOptions::default()
    };

    let resolved = resolve_run(&options, &config);

    assert_eq!(resolved.cache_ttl, Duration::from_secs(5));
}

#[test]
fn test_cli_api_key_overrides_config_api_key() {
    let config = make_config_with_defaults();

    let key = require_api_key(
        Some("cli-key".to_string()),
        &config.google,
        "Google Translate",
        "POTRANS_PRIORITY_UNSET_KEY",
    )
    .unwrap();

    assert_eq!(key, "cli-key");
}

#[test]
fn test_config_api_key_used_when_cli_not_specified() {
    let config = make_config_with_defaults();

    let key = require_api_key(
        None,
        &config.google,
        "Google Translate",
        "POTRANS_PRIORITY_UNSET_KEY",
    )
    .unwrap();

    assert_eq!(key, "config-google-key");
}

#[test]
fn test_missing_api_key_everywhere_is_an_error() {
    let result = require_api_key(
        None,
        &ServiceConfig::default(),
        "Google Translate",
        "POTRANS_PRIORITY_UNSET_KEY",
    );

    assert!(result.is_err());
}

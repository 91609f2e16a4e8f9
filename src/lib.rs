//! # potrans - PO Catalog Translation CLI
//!
//! `potrans` translates gettext PO catalogs with machine-translation
//! backends (Google Translate, DeepL, or a user-supplied script) and caches
//! every result in SQLite so interrupted runs resume where they stopped.
//!
//! ## Features
//!
//! - **Resumable runs**: Already-translated entries are skipped, cached
//!   results are reused, and an aborted run loses nothing it completed
//! - **Caching**: Translations are keyed by text, context, and language
//!   pair in a SQLite database with a configurable TTL
//! - **Multiple backends**: Google Translate, DeepL, or any executable
//!   that reads stdin and writes stdout
//! - **MO output**: Every run compiles the catalog to a binary MO file
//!   alongside the updated PO file
//!
//! ## Quick Start
//!
//! ```bash
//! # Translate a catalog with Google Translate
//! potrans google ./messages.po --api-key $GOOGLE_API_KEY
//!
//! # DeepL, keeping %s et al. untouched
//! potrans deepl ./messages.po --preserve '%[sd]'
//!
//! # Any executable as a backend
//! potrans script ./messages.po --command ./translate.sh
//!
//! # Retranslate everything, including already-translated entries
//! potrans google ./messages.po --all
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/potrans/config.toml`:
//!
//! ```toml
//! [potrans]
//! from = "en"
//! to = "cs"
//! wait = 500
//!
//! [google]
//! api_key_env = "GOOGLE_API_KEY"
//!
//! [deepl]
//! api_key = "xxxx:fx"
//! preserve = '%[sd]'
//! ```

/// Translation cache management using `SQLite`.
pub mod cache;

/// PO catalog model, parser, renderer, and MO compiler.
pub mod catalog;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management and option resolution.
pub mod config;

/// The translation pass over a catalog (skip, cache, backend, wait).
pub mod engine;

/// Cache key derivation for translation lookups.
pub mod fingerprint;

/// File system utilities.
pub mod fs;

/// Global output configuration (quiet mode, colors, stderr/stdout routing).
pub mod output;

/// XDG-style path utilities for configuration and cache.
pub mod paths;

/// Translation backends (Google Translate, DeepL, custom scripts).
pub mod translator;

/// Terminal UI components (progress bar, colors).
pub mod ui;

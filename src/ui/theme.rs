//! Consistent styling utilities for CLI output.
//!
//! Provides color and formatting helpers using owo-colors. All helpers
//! degrade to plain text when colors are disabled (`--no-color` or the
//! `NO_COLOR` environment variable).

use owo_colors::OwoColorize;
use std::fmt::Display;

use crate::output;

/// Styles for different semantic elements.
pub struct Style;

impl Style {
    /// Style for section headers (e.g., the run banner title)
    pub fn header<T: Display>(text: T) -> String {
        if output::is_no_color() {
            text.to_string()
        } else {
            format!("{}", text.bold())
        }
    }

    /// Style for labels/keys (e.g., "Input", "Output dir")
    pub fn label<T: Display>(text: T) -> String {
        if output::is_no_color() {
            text.to_string()
        } else {
            format!("{}", text.dimmed())
        }
    }

    /// Style for primary values (e.g., translated text, file paths)
    pub fn value<T: Display>(text: T) -> String {
        if output::is_no_color() {
            text.to_string()
        } else {
            format!("{}", text.cyan())
        }
    }

    /// Style for secondary/supplementary info (e.g., source text in transcripts)
    pub fn secondary<T: Display>(text: T) -> String {
        if output::is_no_color() {
            text.to_string()
        } else {
            format!("{}", text.dimmed())
        }
    }

    /// Style for success messages
    pub fn success<T: Display>(text: T) -> String {
        if output::is_no_color() {
            text.to_string()
        } else {
            format!("{}", text.green())
        }
    }

    /// Style for error messages
    pub fn error<T: Display>(text: T) -> String {
        if output::is_no_color() {
            text.to_string()
        } else {
            format!("{}", text.red().bold())
        }
    }

    /// Style for warning messages
    pub fn warning<T: Display>(text: T) -> String {
        if output::is_no_color() {
            text.to_string()
        } else {
            format!("{}", text.yellow())
        }
    }
}

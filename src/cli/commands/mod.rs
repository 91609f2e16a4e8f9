//! Subcommand implementations.

/// Translation run handler, shared by every backend subcommand.
pub mod translate;

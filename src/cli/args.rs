use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "potrans")]
#[command(about = "Translate gettext PO files with cached machine translation")]
#[command(version)]
pub struct Args {
    /// Suppress progress and status output
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate a PO file with Google Translate
    Google {
        #[command(flatten)]
        translate: TranslateArgs,

        /// Google API key (overrides GOOGLE_API_KEY and the config file)
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,

        /// Override the Google Translate endpoint URL
        #[arg(long, value_name = "URL")]
        endpoint: Option<String>,
    },
    /// Translate a PO file with DeepL
    Deepl {
        #[command(flatten)]
        translate: TranslateArgs,

        /// DeepL API key (overrides DEEPL_API_KEY and the config file)
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,

        /// Override the DeepL endpoint URL
        #[arg(long, value_name = "URL")]
        endpoint: Option<String>,

        /// Regex matching substrings DeepL must leave untranslated
        #[arg(long, value_name = "REGEX")]
        preserve: Option<String>,
    },
    /// Translate a PO file with a custom translator program
    Script {
        #[command(flatten)]
        translate: TranslateArgs,

        /// Translator program run once per entry, as
        /// `<program> [args..] <from> <to>` with the text on stdin
        #[arg(long, value_name = "PATH")]
        command: Option<PathBuf>,

        /// Extra argument placed before the language pair (repeatable)
        #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

/// Options shared by every translation backend.
#[derive(clap::Args, Debug)]
pub struct TranslateArgs {
    /// Input PO file path
    pub input: PathBuf,

    /// Output directory for the PO and MO files (default: the input
    /// file's directory)
    pub output: Option<PathBuf>,

    /// Source language code (ISO 639-1, e.g. en)
    #[arg(long, value_name = "LANG")]
    pub from: Option<String>,

    /// Target language code (ISO 639-1, e.g. cs)
    #[arg(long, value_name = "LANG")]
    pub to: Option<String>,

    /// Re-translate entries that already have a translation
    #[arg(long)]
    pub all: bool,

    /// Pause after each backend call, in milliseconds
    #[arg(long, value_name = "MS")]
    pub wait: Option<u64>,

    /// Do not read or write the translation cache
    #[arg(long)]
    pub no_cache: bool,

    /// Cache record lifetime, in seconds
    #[arg(long, value_name = "SECS")]
    pub cache_ttl: Option<u64>,

    /// Print each translated entry instead of a progress bar
    #[arg(short, long)]
    pub verbose: bool,
}

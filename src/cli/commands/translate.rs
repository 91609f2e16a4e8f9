use std::path::PathBuf;
use std::pin::pin;

use anyhow::{Context, Result, anyhow};
use futures_util::StreamExt;
use regex::Regex;

use crate::cache::{SqliteCache, TranslationCache};
use crate::catalog::{mo, po};
use crate::cli::args::{Command, TranslateArgs};
use crate::config::{self, ConfigFile, ResolvedRun};
use crate::engine::{PoTranslator, TranslationPass, TranslationSource};
use crate::translator::{DeepLTranslator, GoogleTranslator, ScriptTranslator, Translator};
use crate::ui::{Style, TranslationProgress};
use crate::{paths, status, warn};

const RULE: &str = "-------------------------------------------------------------------------";

/// Everything a translation run needs, merged from CLI and config file.
pub struct TranslateOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub run: ResolvedRun,
    pub force: bool,
    pub no_cache: bool,
    pub verbose: bool,
}

impl TranslateOptions {
    pub fn new(args: TranslateArgs, config: &ConfigFile) -> Self {
        let run = config::resolve_run(
            &config::ResolveOptions {
                from: args.from,
                to: args.to,
                wait: args.wait,
                cache_ttl: args.cache_ttl,
            },
            config,
        );

        Self {
            input: args.input,
            output: args.output,
            run,
            force: args.all,
            no_cache: args.no_cache,
            verbose: args.verbose,
        }
    }
}

/// Builds the backend for a subcommand and runs the translation pass.
pub async fn run(command: Command, config: &ConfigFile) -> Result<()> {
    let (translator, args) = build_backend(command, config)?;
    let options = TranslateOptions::new(args, config);
    run_translate(translator, options).await
}

fn build_backend(
    command: Command,
    config: &ConfigFile,
) -> Result<(Box<dyn Translator>, TranslateArgs)> {
    match command {
        Command::Google {
            translate,
            api_key,
            endpoint,
        } => {
            let api_key = config::require_api_key(
                api_key,
                &config.google,
                "Google Translate",
                "GOOGLE_API_KEY",
            )?;
            let endpoint = endpoint.or_else(|| config.google.endpoint.clone());
            Ok((Box::new(GoogleTranslator::new(api_key, endpoint)), translate))
        }
        Command::Deepl {
            translate,
            api_key,
            endpoint,
            preserve,
        } => {
            let api_key =
                config::require_api_key(api_key, &config.deepl.service, "DeepL", "DEEPL_API_KEY")?;
            let endpoint = endpoint.or_else(|| config.deepl.service.endpoint.clone());
            let preserve = preserve
                .or_else(|| config.deepl.preserve.clone())
                .map(|pattern| {
                    Regex::new(&pattern)
                        .with_context(|| format!("Invalid preserve pattern: {pattern}"))
                })
                .transpose()?;
            Ok((
                Box::new(DeepLTranslator::new(api_key, endpoint, preserve)),
                translate,
            ))
        }
        Command::Script {
            translate,
            command,
            args,
        } => {
            let program = command
                .or_else(|| config.script.command.clone())
                .ok_or_else(|| {
                    anyhow!(
                        "Missing translator program for the script backend\n\n\
                         Please provide it via:\n  \
                         - CLI option: --command <path>\n  \
                         - Config file: ~/.config/potrans/config.toml ([script] command)"
                    )
                })?;
            let args = if args.is_empty() {
                config.script.args.clone()
            } else {
                args
            };
            Ok((Box::new(ScriptTranslator::new(program, args)), translate))
        }
    }
}

/// Runs one translation pass and writes the PO and MO outputs.
pub async fn run_translate(
    translator: Box<dyn Translator>,
    options: TranslateOptions,
) -> Result<()> {
    // Input problems abort before anything is translated or cached.
    let mut catalog = po::load_file(&options.input)?;

    let output_dir = match &options.output {
        Some(dir) => dir.clone(),
        None => options
            .input
            .parent()
            .map_or_else(|| PathBuf::from("."), PathBuf::from),
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;
    let stem = options
        .input
        .file_stem()
        .context("Input path has no file name")?
        .to_string_lossy()
        .into_owned();

    status!("------------------------------");
    status!("{}", Style::header(" PO trans translator"));
    status!("------------------------------");
    status!("{} {}", Style::label("Input:"), options.input.display());
    status!("{} {}", Style::label("Translator:"), translator.name());
    status!(
        "{} from {} to {}",
        Style::label("Translate:"),
        options.run.from,
        options.run.to
    );
    status!("{} {}", Style::label("Output dir:"), output_dir.display());

    let cache = open_cache(&options);
    if !cache.is_enabled() {
        status!("{} off", Style::label("Cache:"));
    }
    status!("{}", Style::label("Translating:"));

    let engine = PoTranslator::new(translator, cache);
    let pass = TranslationPass {
        from: options.run.from.clone(),
        to: options.run.to.clone(),
        force: options.force,
        wait: options.run.wait,
    };

    let total = if options.force {
        catalog.entries.len()
    } else {
        catalog.untranslated_len()
    };

    let mut translated = 0usize;
    let mut from_cache = 0usize;

    {
        let progress = (!options.verbose).then(|| TranslationProgress::new(total as u64));
        let mut stream = pin!(engine.translate(&mut catalog, &pass));

        while let Some(event) = stream.next().await {
            let event = event?;
            match event.source {
                TranslationSource::Backend => translated += 1,
                TranslationSource::Cache => from_cache += 1,
            }

            if let Some(progress) = &progress {
                progress.tick();
            } else {
                status!("{}", Style::secondary(RULE));
                status!(" > {}", event.original);
                status!(" > {}", Style::value(&event.translation));
            }
        }

        if let Some(progress) = &progress {
            progress.finish();
        }
    }

    let skipped = catalog.entries.len() - translated - from_cache;
    status!("");
    status!(
        "{} {} sentences",
        Style::label("Translated:"),
        Style::value(translated)
    );
    status!(
        "{} {} sentences",
        Style::label("From cache:"),
        Style::value(from_cache)
    );
    status!(
        "{} {} sentences",
        Style::label("Skipped:"),
        Style::value(skipped)
    );

    let mo_path = output_dir.join(format!("{stem}.mo"));
    if options.verbose {
        status!(
            "{} {}",
            Style::label("Writing new MO file:"),
            mo_path.display()
        );
    }
    mo::write_file(&catalog, &mo_path)?;

    let po_path = output_dir.join(format!("{stem}.po"));
    if options.verbose {
        status!(
            "{} {}",
            Style::label("Writing new PO file:"),
            po_path.display()
        );
    }
    po::write_file(&catalog, &po_path)?;

    status!("{}", Style::success("DONE!"));

    Ok(())
}

/// Opens the configured cache. Any trouble opening it turns caching off
/// for the run instead of failing; every lookup then misses.
fn open_cache(options: &TranslateOptions) -> TranslationCache {
    if options.no_cache {
        return TranslationCache::Disabled;
    }

    let opened =
        paths::cache_db_path().and_then(|path| SqliteCache::open(path, options.run.cache_ttl));
    match opened {
        Ok(cache) => TranslationCache::Sqlite(cache),
        Err(err) => {
            warn!(
                "{} Translation cache unavailable, continuing without it: {err:#}",
                Style::warning("Warning:")
            );
            TranslationCache::Disabled
        }
    }
}

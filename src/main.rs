// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::app_config::{Config, LogLevel};
use crate::app_controller::{Controller, RunOutcome};

mod app_config;
mod app_controller;
mod builder;
mod chunker;
mod errors;
mod estimator;
mod extraction;
mod language_utils;
mod providers;
mod translation;

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

fn filter_str(level: &LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a PDF document (default command)
    Translate(TranslateArgs),

    /// Show document metadata, page/word/image counts
    Inspect {
        /// Input PDF file
        #[arg(value_name = "INPUT_PDF")]
        input_path: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },

    /// Estimate translation cost without spending anything
    Estimate {
        /// Input PDF file
        #[arg(value_name = "INPUT_PDF")]
        input_path: PathBuf,

        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input PDF file to translate
    #[arg(value_name = "INPUT_PDF")]
    input_path: PathBuf,

    /// Output file path (defaults to <input>.<target>.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// pdflingo - AI-powered PDF translation
///
/// Extracts the text of a PDF book, translates it chunk by chunk with an
/// AI translation service, and assembles a structured translated document.
#[derive(Parser, Debug)]
#[command(name = "pdflingo")]
#[command(version = "0.1.0")]
#[command(about = "AI-powered PDF translation tool")]
#[command(long_about = "pdflingo extracts the text of a PDF document and translates it with an AI service.

EXAMPLES:
    pdflingo book.pdf                     # Translate using default config
    pdflingo -s en -t es book.pdf         # Translate from English to Spanish
    pdflingo -m claude-haiku-4-5-20251001 book.pdf
    pdflingo inspect book.pdf             # Show metadata and counts
    pdflingo estimate book.pdf            # Project cost before committing

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input PDF file to translate
    #[arg(value_name = "INPUT_PDF")]
    input_path: Option<PathBuf>,

    /// Output file path (defaults to <input>.<target>.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Inspect {
            input_path,
            config_path,
        }) => {
            let config = load_config(&config_path, &TranslateOverrides::default())?;
            init_logging(&config, None);
            run_inspect(&config, &input_path)
        }
        Some(Commands::Estimate {
            input_path,
            config_path,
        }) => {
            let config = load_config(&config_path, &TranslateOverrides::default())?;
            init_logging(&config, None);
            run_estimate(&config, &input_path)
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior: use top-level args as an implicit translate
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PDF is required when no subcommand is specified"))?;

            let args = TranslateArgs {
                input_path,
                output: cli.output,
                force_overwrite: cli.force_overwrite,
                model: cli.model,
                source_language: cli.source_language,
                target_language: cli.target_language,
                config_path: cli.config_path,
                log_level: cli.log_level,
            };
            run_translate(args).await
        }
    }
}

#[derive(Default)]
struct TranslateOverrides {
    model: Option<String>,
    source_language: Option<String>,
    target_language: Option<String>,
    log_level: Option<LogLevel>,
}

fn init_logging(config: &Config, cli_level: Option<&LogLevel>) {
    let level = cli_level.unwrap_or(&config.log_level);
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(filter_str(level)),
    )
    .init();
}

/// Load the config file, creating a default one when missing, and apply
/// CLI overrides on top.
fn load_config(config_path: &str, overrides: &TranslateOverrides) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        Config::from_file(config_path)?
    } else {
        eprintln!(
            "Config file not found at '{}', creating default config.",
            config_path
        );
        let config = Config::default();
        config
            .save(config_path)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    if let Some(model) = &overrides.model {
        config.translation.model = model.clone();
    }
    if let Some(source) = &overrides.source_language {
        config.source_language = source.clone();
    }
    if let Some(target) = &overrides.target_language {
        config.target_language = target.clone();
    }
    if let Some(level) = &overrides.log_level {
        config.log_level = level.clone();
    }

    Ok(config)
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    let overrides = TranslateOverrides {
        model: options.model.clone(),
        source_language: options.source_language.clone(),
        target_language: options.target_language.clone(),
        log_level: options.log_level.clone().map(Into::into),
    };
    let config = load_config(&options.config_path, &overrides)?;
    init_logging(&config, overrides.log_level.as_ref());

    config
        .validate_for_translation()
        .context("Configuration validation failed")?;

    if !options.input_path.is_file() {
        return Err(anyhow!("Input file does not exist: {:?}", options.input_path));
    }

    let output_path = options.output.clone().unwrap_or_else(|| {
        let stem = options
            .input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        options
            .input_path
            .with_file_name(format!("{}.{}.json", stem, config.target_language))
    });
    ensure_output_writable(&output_path, options.force_overwrite)?;

    let controller = Controller::with_config(config.clone())?;

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} chunks")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    let progress_cb = progress.clone();

    let outcome = controller
        .run(&options.input_path, move |done, total| {
            progress_cb.set_length(total as u64);
            progress_cb.set_position(done as u64);
        })
        .await?;
    progress.finish_and_clear();

    match outcome {
        RunOutcome::Complete { document, estimate } => {
            let json = serde_json::to_string_pretty(&document)
                .context("Failed to serialize output document")?;
            std::fs::write(&output_path, json)
                .with_context(|| format!("Failed to write output file: {:?}", output_path))?;
            info!(
                "Wrote {:?} ({} chapters, estimated cost ${:.2})",
                output_path,
                document.chapters.len(),
                estimate.total_cost
            );
            Ok(())
        }
        RunOutcome::Partial { report, .. } => {
            for failure in &report.failures {
                warn!("Chunk {} failed: {}", failure.sequence_index, failure.error);
            }
            Err(anyhow!(
                "Translation incomplete: {}/{} chunks failed{}",
                report.failures.len(),
                report.total_chunks,
                if report.halted {
                    " (run halted by a fatal error)"
                } else {
                    ""
                }
            ))
        }
    }
}

/// Refuse to clobber an existing output file unless forced, with a
/// non-zero exit so scripts notice.
fn ensure_output_writable(path: &Path, force_overwrite: bool) -> Result<()> {
    if path.exists() && !force_overwrite {
        return Err(anyhow!(
            "Output file already exists: {:?}. Use -f to force overwrite.",
            path
        ));
    }
    Ok(())
}

fn run_inspect(config: &Config, input_path: &Path) -> Result<()> {
    let controller = Controller::with_config(config.clone())?;
    let info = controller.inspect(input_path)?;

    println!("Title:  {}", info.title.as_deref().unwrap_or("(none)"));
    println!("Author: {}", info.author.as_deref().unwrap_or("(none)"));
    println!("Pages:  {}", info.page_count);
    println!("Words:  {}", info.word_count);
    println!("Images: {}", info.image_count);
    Ok(())
}

fn run_estimate(config: &Config, input_path: &Path) -> Result<()> {
    let controller = Controller::with_config(config.clone())?;
    let estimate = controller.estimate(input_path)?;

    println!("Model:         {}", estimate.model);
    println!("Words:         {}", estimate.word_count);
    println!("Input tokens:  {}", estimate.input_tokens);
    println!("Output tokens: {}", estimate.output_tokens);
    println!("Input cost:    ${:.4}", estimate.input_cost);
    println!("Output cost:   ${:.4}", estimate.output_cost);
    println!("Total cost:    ${:.4}", estimate.total_cost);
    Ok(())
}

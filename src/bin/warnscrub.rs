//! Warnscrub CLI - locate compiler warnings and comment out the offending lines.

use std::io::Write;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use warnscrub::commenter::comment_json;
use warnscrub::compiler;
use warnscrub::config::Config;
use warnscrub::errors::{exit_code, WarnscrubError};
use warnscrub::input::{stdin_is_piped, InputSource};
use warnscrub::locator::ScanOptions;
use warnscrub::output::{format_records, format_signatures, OutputFormat};
use warnscrub::pipeline::Fixer;
use warnscrub::signature::Signature;

#[derive(Parser)]
#[command(name = "warnscrub")]
#[command(about = "Locate compiler warnings and comment out the offending lines")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging, including a trace of every scanned line
    #[arg(long, global = true)]
    debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "debug")]
    quiet: bool,

    /// Config file (defaults to .warnscrub.toml in the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print errors as a JSON object on stderr
    #[arg(long, global = true)]
    json_errors: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Find warnings in compiler output and print their locations as JSON
    Find {
        /// Warning kind to look for
        #[arg(short, long, value_enum)]
        signature: SignatureArg,

        /// Compiler output given directly on the command line
        #[arg(short = 'c', long, value_name = "TEXT")]
        text_input: Option<String>,

        /// File with compiler output (defaults to piped stdin, then WARNINGS.md)
        input_file: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: FormatArg,
    },

    /// Comment out the lines listed in a JSON array of locations
    Comment {
        /// JSON given directly on the command line
        #[arg(short = 'c', long, value_name = "JSON_TEXT")]
        text_input: Option<String>,

        /// JSON file (defaults to piped stdin)
        input_file: Option<PathBuf>,

        /// Comment marker to insert
        #[arg(long)]
        marker: Option<String>,

        /// Report what would change without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Run the build command and print its combined output
    Compile {
        /// Save the output to this file
        #[arg(long, conflicts_with = "no_save")]
        save: Option<PathBuf>,

        /// Do not save the output to a file
        #[arg(long)]
        no_save: bool,

        /// Build command to run instead of the configured one
        #[arg(last = true)]
        command: Vec<String>,
    },

    /// Build, find warnings of one kind, and comment them out
    Fix {
        /// Warning kind to fix
        #[arg(short, long, value_enum)]
        signature: SignatureArg,

        /// Comment marker to insert
        #[arg(long)]
        marker: Option<String>,

        /// Report what would change without writing files
        #[arg(long)]
        dry_run: bool,

        /// Keep going when the build exits non-zero but printed output
        #[arg(long)]
        allow_failed_build: bool,
    },

    /// Show supported warning signatures
    Signatures {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SignatureArg {
    /// '... is undefined or private'
    UndefinedPrivate,
    /// 'unused alias ...'
    UnusedAlias,
}

impl From<SignatureArg> for Signature {
    fn from(arg: SignatureArg) -> Self {
        match arg {
            SignatureArg::UndefinedPrivate => Signature::UndefinedOrPrivate,
            SignatureArg::UnusedAlias => Signature::UnusedAlias,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Text,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Text => OutputFormat::Text,
        }
    }
}

fn init_logging(debug: bool, quiet: bool) {
    // RUST_LOG takes precedence; the flags only pick the fallback level.
    let level = if debug {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_target(false),
        )
        .with(filter)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug, cli.quiet);

    let result = run(cli.command, cli.config, cli.debug);

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            if cli.json_errors {
                #[derive(Serialize)]
                struct ErrorOutput {
                    error: String,
                }

                let payload = ErrorOutput {
                    error: e.to_string(),
                };

                let json = serde_json::to_string(&payload)
                    .unwrap_or_else(|_| "{\"error\":\"serialization failed\"}".to_string());
                eprintln!("{json}");
            } else {
                eprintln!("error: {}", e);
            }
            std::process::exit(exit_code(&e));
        }
    }
}

/// Run a command, returning the process exit code on success.
fn run(command: Commands, config_path: Option<PathBuf>, debug: bool) -> Result<i32, WarnscrubError> {
    if let Commands::Completions { shell } = command {
        generate(shell, &mut Cli::command(), "warnscrub", &mut std::io::stdout());
        return Ok(0);
    }
    if let Commands::Signatures { json } = command {
        print!("{}", format_signatures(json)?);
        return Ok(0);
    }

    let cwd = std::env::current_dir()?;
    let config = Config::load(config_path.as_deref(), &cwd)?;

    match command {
        Commands::Find {
            signature,
            text_input,
            input_file,
            format,
        } => run_find(&config, signature.into(), text_input, input_file, format.into(), debug),
        Commands::Comment {
            text_input,
            input_file,
            marker,
            dry_run,
        } => run_comment(&config, text_input, input_file, marker, dry_run),
        Commands::Compile {
            save,
            no_save,
            command,
        } => run_compile(&config, save, no_save, command),
        Commands::Fix {
            signature,
            marker,
            dry_run,
            allow_failed_build,
        } => run_fix(
            &config,
            signature.into(),
            marker,
            dry_run,
            allow_failed_build,
            debug,
        ),
        Commands::Signatures { .. } | Commands::Completions { .. } => Ok(0),
    }
}

// --- Find command ---

fn run_find(
    config: &Config,
    signature: Signature,
    text_input: Option<String>,
    input_file: Option<PathBuf>,
    format: OutputFormat,
    debug: bool,
) -> Result<i32, WarnscrubError> {
    let source = InputSource::resolve(
        text_input,
        input_file,
        stdin_is_piped(),
        Some(&config.find.default_input),
    )?;
    info!("input source: {}", source.describe());

    let options = ScanOptions { trace: debug };
    let outcome = source.locate(signature, &options)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(format_records(&outcome.records, format)?.as_bytes())?;
    out.flush()?;
    Ok(0)
}

// --- Comment command ---

fn run_comment(
    config: &Config,
    text_input: Option<String>,
    input_file: Option<PathBuf>,
    marker: Option<String>,
    dry_run: bool,
) -> Result<i32, WarnscrubError> {
    let source = InputSource::resolve(text_input, input_file, stdin_is_piped(), None)?;
    let json = source.read_to_string()?;

    let mut options = config.comment_options();
    if let Some(marker) = marker {
        options.marker = marker;
    }
    options.dry_run = dry_run;

    let report = comment_json(&json, &source.describe(), &options)?;
    if !report.is_success() {
        return Err(WarnscrubError::ItemsFailed {
            failed: report.failures.len(),
        });
    }
    Ok(0)
}

// --- Compile command ---

fn run_compile(
    config: &Config,
    save: Option<PathBuf>,
    no_save: bool,
    command: Vec<String>,
) -> Result<i32, WarnscrubError> {
    let mut options = config.compile_options();
    if !command.is_empty() {
        options.command = command;
    }
    if no_save {
        options.save_to = None;
    } else if save.is_some() {
        options.save_to = save;
    }

    let output = compiler::run(&options)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(output.text.as_bytes())?;
    out.flush()?;

    Ok(output.exit_code())
}

// --- Fix command ---

fn run_fix(
    config: &Config,
    signature: Signature,
    marker: Option<String>,
    dry_run: bool,
    allow_failed_build: bool,
    debug: bool,
) -> Result<i32, WarnscrubError> {
    let mut comment = config.comment_options();
    if let Some(marker) = marker {
        comment.marker = marker;
    }

    let report = Fixer::new(signature)
        .compile_options(config.compile_options())
        .comment_options(comment)
        .dry_run(dry_run)
        .allow_failed_build(allow_failed_build)
        .trace(debug)
        .run()?;

    info!(
        "{} '{}' warning site(s) located, {} line(s) {}",
        report.scan.records.len(),
        report.signature,
        report.modified(),
        if dry_run { "would be commented" } else { "commented" }
    );
    Ok(0)
}

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use lintdock::Error;
use lintdock::config::{self, Config, Isolation};
use lintdock::pipeline::{self, Environment, PipelineInput, SandboxDispatcher, Task, report};

/// Exit code for configuration errors; nothing was run.
const EXIT_CONFIG: u8 = 3;
const EXIT_ENVIRONMENT: u8 = 2;
const EXIT_FAILED: u8 = 1;

/// Run linters, formatters and secret scanners for the languages found in a repository
#[derive(Parser)]
#[command(name = "lintdock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory to scan (defaults to the current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Config file (defaults to .lintdock.yml in the scan root)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Check this shell script instead of discovering scripts
    #[arg(long, global = true, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Where tools run
    #[arg(long, global = true, value_enum)]
    isolation: Option<Isolation>,

    /// Container engine binary
    #[arg(long, global = true)]
    engine: Option<String>,

    /// Secret baseline path, relative to the scan root
    #[arg(long, global = true, value_name = "FILE")]
    baseline: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also write the JSON report to this file
    #[arg(long, global = true, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Enable verbose output, including tool output as it streams
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run security, lint and format checks
    Check,

    /// Run linters only
    Lint {
        /// Restrict to one language (shell, python, terraform)
        #[arg(long)]
        language: Option<String>,
    },

    /// Run formatters in check mode
    Format {
        /// Rewrite files instead of reporting
        #[arg(long)]
        fix: bool,
    },

    /// Run secret scanners, creating the baseline on first run
    Security,
}

impl Commands {
    fn task(&self) -> Task {
        match self {
            Commands::Check => Task::Check,
            Commands::Lint { language } => Task::Lint {
                language: language.clone(),
            },
            Commands::Format { fix } => Task::Format { fix: *fix },
            Commands::Security => Task::Security,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version land here too
            return if err.use_stderr() {
                ExitCode::from(EXIT_CONFIG)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let root = resolve_root(cli)?;
    let cfg = load_config(cli, &root)?;

    let input = PipelineInput::from_config(cli.command.task(), root.clone(), &cfg)?;
    let mut dispatcher = SandboxDispatcher::new(Environment {
        isolation: cfg.isolation,
        engine: cfg.engine.clone(),
        root,
    });

    let run_report = pipeline::run_pipeline(&input, &mut dispatcher)?;

    match cli.format {
        OutputFormat::Text => print!("{}", report::render_text(&run_report)),
        OutputFormat::Json => println!("{}", report::render_json(&run_report)?),
    }
    if let Some(path) = &cli.report {
        report::write_json(&run_report, path)?;
    }

    let code = run_report.exit_code();
    debug!(code, "done");
    Ok(u8::try_from(code).unwrap_or(EXIT_FAILED))
}

fn resolve_root(cli: &Cli) -> Result<PathBuf> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let root = std::fs::canonicalize(&root)
        .map_err(|e| Error::Config(format!("scan root {}: {e}", root.display())))?;
    if !root.is_dir() {
        return Err(Error::Config(format!("scan root {} is not a directory", root.display())).into());
    }
    Ok(root)
}

/// Config file values, then command-line overrides.
fn load_config(cli: &Cli, root: &std::path::Path) -> Result<Config> {
    let loaded = match &cli.config {
        Some(path) => config::load_file(path),
        None => config::load(root),
    };
    let mut cfg = loaded.map_err(|e| Error::Config(format!("{e:#}")))?;

    if let Some(script) = &cli.script {
        cfg.script = Some(script.clone());
    }
    if let Some(isolation) = cli.isolation {
        cfg.isolation = isolation;
    }
    if let Some(engine) = &cli.engine {
        cfg.engine = engine.clone();
    }
    if let Some(baseline) = &cli.baseline {
        cfg.baseline = baseline.clone();
    }
    Ok(cfg)
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<Error>() {
        Some(e) if e.is_config() => EXIT_CONFIG,
        Some(Error::EnvironmentUnavailable(_)) => EXIT_ENVIRONMENT,
        _ => EXIT_FAILED,
    }
}

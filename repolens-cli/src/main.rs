//! RepoLens CLI - command-line interface for repository analysis
//!
//! Reports go to stdout as JSON or Markdown; logs go to stderr.

mod render;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use repolens_applications::GitHubAnalysisService;
use repolens_core::{
    init_logging, log_operation_error, log_operation_start, log_operation_success, LoggingConfig,
    RepoId, RepoLensConfig,
};
use repolens_repo::parse_repo_url;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "repolens")]
#[command(about = "Analyze GitHub repositories: metrics, code structure and generated documentation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format for reports
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Full analysis: metrics, commit activity, code structure and README
    Analyze {
        /// Repository URL or owner/name
        repo: String,
    },

    /// Full analysis plus code quality, maintenance score and contribution guidelines
    Developer {
        /// Repository URL or owner/name
        repo: String,
    },

    /// Generate a README for a repository
    Readme {
        /// Repository URL or owner/name
        repo: String,

        /// Write the README here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Scores and improvement suggestions
    Feedback {
        /// Repository URL or owner/name
        repo: String,
    },

    /// Manage configuration
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,

        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging_config = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::quiet()
    };
    init_logging(&logging_config).map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;

    info!("Starting RepoLens CLI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Config {
            init,
            show,
            validate,
        } => handle_config(cli.config.as_deref(), init, show, validate),
        Commands::Analyze { repo } => {
            let service = build_service(cli.config.as_deref())?;
            let id = parse_repo(&repo)?;
            let analysis = service.get_full_analysis(&id.owner, &id.name).await;
            emit(cli.format, &analysis, render::analysis)
        }
        Commands::Developer { repo } => {
            let service = build_service(cli.config.as_deref())?;
            let id = parse_repo(&repo)?;
            let developer = service.get_developer_analysis(&id.owner, &id.name).await;
            emit(cli.format, &developer, render::developer)
        }
        Commands::Readme { repo, output } => {
            let service = build_service(cli.config.as_deref())?;
            let id = parse_repo(&repo)?;
            let report = service.generate_readme(&id.owner, &id.name).await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &report.readme.text)
                        .with_context(|| format!("Failed to write README to {}", path.display()))?;
                    eprintln!("README written to {}", path.display());
                    Ok(())
                }
                None => emit(cli.format, &report, |r| r.readme.text.clone()),
            }
        }
        Commands::Feedback { repo } => {
            let service = build_service(cli.config.as_deref())?;
            let id = parse_repo(&repo)?;
            let feedback = service.get_code_feedback(&id.owner, &id.name).await?;
            emit(cli.format, &feedback, render::feedback)
        }
    }
}

fn parse_repo(input: &str) -> anyhow::Result<RepoId> {
    parse_repo_url(input).map_err(|e| {
        log_operation_error!("parse_repo_url", e, repo = %input);
        anyhow!(e)
    })
}

fn build_service(config_path: Option<&Path>) -> anyhow::Result<GitHubAnalysisService> {
    let config = RepoLensConfig::load(config_path)?;
    config.validate()?;
    Ok(GitHubAnalysisService::from_config(&config)?)
}

fn emit<T, F>(format: OutputFormat, report: &T, markdown: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Markdown => println!("{}", markdown(report)),
    }
    Ok(())
}

fn handle_config(path: Option<&Path>, init: bool, show: bool, validate: bool) -> anyhow::Result<()> {
    if !(init || show || validate) {
        bail!("Nothing to do; pass --init, --show or --validate");
    }

    if init {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => RepoLensConfig::default_paths()
                .into_iter()
                .next()
                .context("No configuration directory available")?,
        };
        if config_path.exists() {
            bail!("Configuration already exists at {}", config_path.display());
        }
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        log_operation_start!("config_init", path = %config_path.display());
        RepoLensConfig::default().save_to_file(&config_path)?;
        log_operation_success!("config_init");

        println!("Configuration initialized at: {}", config_path.display());
        println!("Set GITHUB_TOKEN and GEMINI_API_KEY, or edit the file to add them.");
    }

    let config = RepoLensConfig::load(path)?;

    if show {
        println!("{}", toml::to_string_pretty(&render::redacted(&config))?);
    }

    if validate {
        match config.validate() {
            Ok(()) => println!("Configuration is valid"),
            Err(e) => {
                println!("Configuration validation failed: {}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}

//! linkshelf CLI
//!
//! Command-line interface for linkshelf: a local, ordered link collection
//! that can be filled from GitHub and Vercel.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use linkshelf_core::{Config, LinkStore, Session};

mod commands;
mod editor;
mod metadata;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "linkshelf")]
#[command(about = "linkshelf - a local, ordered link collection")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a link
    Add {
        /// URL to save
        url: String,
        /// Title (fetched from the page when omitted)
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Version (defaults to 1.0.0)
        #[arg(long = "link-version", value_name = "VERSION")]
        version: Option<String>,
    },
    /// List links in order
    #[command(alias = "ls")]
    List,
    /// Show link details
    Show {
        /// Link ID (full ID or prefix)
        id: String,
    },
    /// Open a link in the browser
    Open {
        /// Link ID (full ID or prefix)
        id: String,
    },
    /// Edit a link (prompts when no fields are given)
    Edit {
        /// Link ID (full ID or prefix)
        id: String,
        #[arg(short = 'T', long)]
        title: Option<String>,
        #[arg(short, long)]
        url: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long = "link-version", value_name = "VERSION")]
        version: Option<String>,
    },
    /// Delete a link
    #[command(alias = "rm")]
    Delete {
        /// Link ID (full ID or prefix)
        id: String,
    },
    /// Move a link to another link's position
    #[command(alias = "mv")]
    Move {
        /// Link to move
        dragged: String,
        /// Link whose position it takes
        target: String,
    },
    /// Import links from a provider
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show storage location and link count
    Status,
}

#[derive(Subcommand)]
enum ImportCommands {
    /// Import public repositories of a GitHub user
    Github {
        /// GitHub username (defaults to github_username from config)
        username: Option<String>,
        /// Repository to skip
        #[arg(long)]
        exclude: Option<String>,
    },
    /// Import deployed Vercel projects
    Vercel {
        /// API token (defaults to vercel_token from config)
        #[arg(long)]
        token: Option<String>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, github_username, github_token,
        /// github_exclude_repo, vercel_token, log_file)
        key: String,
        /// Configuration value ("none" clears optional keys; log_file accepts "default")
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work even when the config file is broken
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    init_logging(&config);

    let mut store = LinkStore::open_with_config(&config);
    let mut session = Session::new();

    match cli.command {
        Commands::Add {
            url,
            title,
            description,
            version,
        } => commands::link::add(&mut store, url, title, description, version, &output).await,
        Commands::List => commands::link::list(&store, &output),
        Commands::Show { id } => commands::link::show(&store, &id, &output),
        Commands::Open { id } => commands::link::open(&store, &id, &output),
        Commands::Edit {
            id,
            title,
            url,
            description,
            version,
        } => {
            let fields = commands::link::EditFields {
                title,
                url,
                description,
                version,
            };
            commands::link::edit(&mut store, &mut session, &id, fields, &output)
        }
        Commands::Delete { id } => commands::link::delete(&mut store, &mut session, &id, &output),
        Commands::Move { dragged, target } => {
            commands::link::move_link(&mut store, &dragged, &target, &output)
        }
        Commands::Import { command } => handle_import_command(command, &mut store, &config, &output).await,
        Commands::Status => commands::status::show(&store, &config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

async fn handle_import_command<P: linkshelf_core::Persistence>(
    command: ImportCommands,
    store: &mut LinkStore<P>,
    config: &Config,
    output: &Output,
) -> Result<()> {
    match command {
        ImportCommands::Github { username, exclude } => {
            commands::import::github(store, config, username, exclude, output).await
        }
        ImportCommands::Vercel { token } => {
            commands::import::vercel(store, config, token, output).await
        }
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging
///
/// Filter comes from LINKSHELF_LOG (default `warn`). Logs go to stderr, or
/// are appended to `log_file` when one is configured.
fn init_logging(config: &Config) {
    let level = std::env::var("LINKSHELF_LOG").unwrap_or_else(|_| "warn".to_string());
    let env_filter = EnvFilter::try_new(format!(
        "linkshelf_core={},linkshelf_cli={}",
        level, level
    ))
    .unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    match &config.log_file {
        Some(log_path) => {
            let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
                    return;
                }
            };
            // Ignore error if already initialized
            let _ = builder.with_ansi(false).with_writer(log_file).try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
}

//! snipstash - save dated code snippets to a document store.
//!
//! This is the main entry point for the snipstash CLI.

mod commands;
mod terminal;

use clap::{Parser, Subcommand};
use commands::*;
use snipstash_core::{default_date, Config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "snipstash")]
#[command(author, version, about = "Save, list and delete dated code snippets", long_about = None)]
struct Cli {
    /// Config file, applied after the global and project configs
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Document store to use (memory, json, firestore)
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the document store is reachable
    Probe,
    /// List saved snippets, newest first
    List {
        /// Print the list as HTML
        #[arg(long)]
        html: bool,
    },
    /// Save a snippet
    Add {
        /// Date for the snippet (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Code to save
        #[arg(short, long, conflicts_with = "file")]
        code: Option<String>,
        /// Read the code from a file (stdin if neither --code nor --file is given)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Delete a saved snippet
    Delete {
        /// Snippet ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show configuration
    Config,
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir()?;
    let (mut config, sources) = Config::load(Some(&cwd), cli.config.as_deref()).await?;
    if let Some(backend) = &cli.backend {
        config.backend = Some(backend.parse()?);
    }

    init_logging(cli.verbose, config.log_level().into());
    tracing::debug!(
        backend = config.backend().as_str(),
        collection = config.collection(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Probe => handle_probe(&config).await,
        Commands::List { html } => handle_list(&config, html).await,
        Commands::Add { date, code, file } => {
            let source = match (code, file) {
                (Some(code), _) => CodeSource::Inline(code),
                (None, Some(path)) => CodeSource::File(path),
                (None, None) => CodeSource::Stdin,
            };
            handle_add(&config, date.unwrap_or_else(default_date), source).await
        }
        Commands::Delete { id, yes } => handle_delete(&config, &id, yes).await,
        Commands::Config => {
            show_config(&config, &sources)?;
            Ok(())
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Show the effective configuration with credentials masked.
fn show_config(config: &Config, sources: &[PathBuf]) -> anyhow::Result<()> {
    println!("Configuration sources:");
    if sources.is_empty() {
        println!("  (none)");
    } else {
        for source in sources {
            println!("  {}", source.display());
        }
    }
    println!();

    println!("Backend: {}", config.backend().as_str());
    println!("Collection: {}", config.collection());
    println!();

    println!("Current configuration:");
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);

    Ok(())
}

/// Print version information.
fn print_version() {
    println!("snipstash {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Save, list and delete dated code snippets.");
}

//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod analyze;
mod health;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "startup-analyst")]
#[command(about = "AI-assisted analysis of startup pitch documents")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the JSON API server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT (default from config, 127.0.0.1:3000)
        bind: Option<String>,
    },

    /// Analyze a document for one category
    Analyze {
        /// Text file, PDF or image to analyze
        file: PathBuf,
        /// Analysis category (company, financial, team, market, risk, recommendation)
        #[arg(short = 't', long = "type")]
        analysis_type: String,
    },

    /// Extract text from a document with OCR
    Extract {
        /// PDF or image file
        file: PathBuf,
    },

    /// Write an executive summary from analysis results
    Summarize {
        /// JSON file with prior analysis results
        file: PathBuf,
    },

    /// Check that the cloud services are reachable
    Health,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load_with_override(cli.config.as_deref()).await?;

    if let Some(path) = &config.source_path {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            serve::cmd_serve(&config, &bind).await
        }
        Commands::Analyze {
            file,
            analysis_type,
        } => analyze::cmd_analyze(&config, &file, &analysis_type).await,
        Commands::Extract { file } => analyze::cmd_extract(&config, &file).await,
        Commands::Summarize { file } => analyze::cmd_summarize(&config, &file).await,
        Commands::Health => health::cmd_health(&config).await,
    }
}

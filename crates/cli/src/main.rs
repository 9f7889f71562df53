//! CareTutor CLI — the main entry point.
//!
//! Commands:
//! - `onboard`    — Write a starter config file
//! - `ask`        — Answer a single question
//! - `chat`       — Interactive chat mode
//! - `serve`      — Start the HTTP API server
//! - `documents`  — List the store's patient-data and guideline documents
//! - `frameworks` — Show the framework catalog and its skip report
//! - `status`     — Show the resolved configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "caretutor",
    about = "CareTutor — a tutoring assistant for your health data",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter configuration file
    Onboard,

    /// Answer a single question and exit
    Ask {
        /// The question to ask
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Chat interactively
    Chat,

    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List the documents the store holds for this patient
    Documents,

    /// Show the framework catalog and any skipped documents
    Frameworks,

    /// Show the resolved configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Ask { query } => commands::ask::run(query.join(" ")).await?,
        Commands::Chat => commands::chat::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Documents => commands::documents::run().await?,
        Commands::Frameworks => commands::frameworks::run().await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}

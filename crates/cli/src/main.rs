//! Coming-soon CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! cs-cli migrate
//!
//! # List subscribers, newest first
//! cs-cli subscribers list
//!
//! # Export subscribers as CSV
//! cs-cli subscribers export -o subscribers.csv
//!
//! # Export into a directory as subscribers-YYYY-MM-DD.csv
//! cs-cli subscribers export -o exports/
//!
//! # Delete a subscriber by id or email
//! cs-cli subscribers delete jane@example.com
//!
//! # Print the page content as served
//! cs-cli content show
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `subscribers` - List, export and delete subscribers
//! - `content show` - Print the merged page content as JSON

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cs-cli")]
#[command(author, version, about = "Coming-soon site CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage subscribers
    Subscribers {
        #[command(subcommand)]
        action: SubscriberAction,
    },
    /// Inspect page content
    Content {
        #[command(subcommand)]
        action: ContentAction,
    },
}

#[derive(Subcommand)]
enum SubscriberAction {
    /// List subscribers, newest first
    List,
    /// Export subscribers as CSV
    Export {
        /// Output file or directory (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a subscriber
    Delete {
        /// Subscriber id, or the email address it was registered with
        target: String,
    },
}

#[derive(Subcommand)]
enum ContentAction {
    /// Print the page content as served, merged over the defaults
    Show,
}

#[tokio::main]
async fn main() {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Subscribers { action } => match action {
            SubscriberAction::List => commands::subscribers::list().await?,
            SubscriberAction::Export { output } => {
                commands::subscribers::export(output.as_deref()).await?;
            }
            SubscriberAction::Delete { target } => {
                commands::subscribers::delete(&target).await?;
            }
        },
        Commands::Content { action } => match action {
            ContentAction::Show => commands::content::show().await?,
        },
    }
    Ok(())
}

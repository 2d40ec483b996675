//! User Directory CLI - Database migrations and a terminal front-end.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! userdir migrate
//!
//! # List users, optionally filtered by name
//! userdir list --search ann
//!
//! # Create a user with a profile image
//! userdir create -n "Ann Lee" -e ann@example.com -i ./ann.png
//!
//! # Update or delete a user
//! userdir update 1 --phone 555-0100
//! userdir delete 1
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `list`, `create`, `update`, `delete` - Manage users through the HTTP API

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "userdir")]
#[command(author, version, about = "User directory CLI tools")]
struct Cli {
    /// Base URL of the user directory API
    #[arg(
        long,
        global = true,
        env = "USERDIR_API_URL",
        default_value = "http://127.0.0.1:3000"
    )]
    api_url: Url,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// List users, newest first
    List {
        /// Only show users whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Create a user
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address (must be unique)
        #[arg(short, long)]
        email: String,

        /// Phone number
        #[arg(short, long, default_value = "")]
        phone: String,

        /// LinkedIn profile URL
        #[arg(short, long, default_value = "")]
        linkedin: String,

        /// Profile image file
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Update a user; omitted fields keep their value
    Update {
        /// User ID
        id: String,

        #[command(flatten)]
        changes: commands::users::FieldChanges,
    },
    /// Delete a user
    Delete {
        /// User ID
        id: String,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
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
    let api_url = cli.api_url;

    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::List { search } => commands::users::list(api_url, search).await?,
        Commands::Create {
            name,
            email,
            phone,
            linkedin,
            image,
        } => {
            let fields = commands::users::NewUserFields {
                name,
                email,
                phone,
                linkedin_url: linkedin,
                image,
            };
            commands::users::create(api_url, fields).await?;
        }
        Commands::Update { id, changes } => {
            commands::users::update(api_url, &id, changes).await?;
        }
        Commands::Delete { id } => commands::users::delete(api_url, &id).await?,
    }
    Ok(())
}

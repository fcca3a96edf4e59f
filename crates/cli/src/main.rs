//! Shelfkeeper CLI - schema migration and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Bring the database schema up to date
//! sk-cli migrate
//!
//! # Create a login
//! sk-cli user create -e clerk@example.com -p 'correct horse'
//!
//! # Load products from a YAML file
//! sk-cli seed products fixtures/products.yaml
//!
//! # Point any command at another database
//! sk-cli --database-url sqlite://other.db migrate
//! ```
//!
//! All commands read the same environment as the web app
//! (`SHELFKEEPER_DATABASE_URL`, `SHELFKEEPER_UPLOAD_DIR`, ...).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sk-cli")]
#[command(author, version, about = "Shelfkeeper CLI tools")]
struct Cli {
    /// Database URL, overriding `SHELFKEEPER_DATABASE_URL`
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bring the database schema up to date
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products listed in a YAML file
    Products {
        /// Path to the YAML file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = cli.database_url.as_deref();

    match cli.command {
        Commands::Migrate => commands::migrate::run(database_url).await?,
        Commands::User { action } => match action {
            UserAction::Create { email, password } => {
                commands::user::create_user(database_url, &email, &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => {
                commands::seed::products(database_url, &file).await?;
            }
        },
    }
    Ok(())
}

//! Sales rep portal CLI - Multipass and roster tools.
//!
//! # Usage
//!
//! ```bash
//! # Issue a Multipass token and print the sign-in URL
//! rp-cli token --email buyer@example.com --return-to /collections/all
//!
//! # Verify and decrypt a token
//! rp-cli inspect <token>
//!
//! # List the customers assigned to a rep
//! rp-cli roster --rep rep@example.com --query bistro
//!
//! # Hash the shared rep password for SALES_REP_PASSWORD_HASH
//! echo -n 'the password' | rp-cli hash-password
//! ```
//!
//! Reads the same environment variables (and `.env`) as the portal.
//! Results go to stdout, logs to stderr.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rp-cli")]
#[command(author, version, about = "Sales rep portal CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a Multipass token and print the storefront sign-in URL
    Token {
        /// Customer email address
        #[arg(short, long)]
        email: String,

        /// Storefront path to land on after sign-in
        #[arg(short, long)]
        return_to: Option<String>,
    },
    /// Verify and decrypt a Multipass token
    Inspect {
        /// Token (or full sign-in URL)
        token: String,
    },
    /// Fetch the roster and list customers assigned to a rep
    Roster {
        /// Rep email address
        #[arg(short, long)]
        rep: String,

        /// Filter by name, company, email or customer number
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Read a password from stdin and print its argon2 hash
    HashPassword,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output can be piped
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rep_portal=warn,rp_cli=info".into());
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
    match cli.command {
        Commands::Token { email, return_to } => {
            commands::token::issue(&email, return_to.as_deref())?;
        }
        Commands::Inspect { token } => commands::token::inspect(&token)?,
        Commands::Roster { rep, query } => {
            commands::roster::list(&rep, query.as_deref()).await?;
        }
        Commands::HashPassword => commands::password::hash_from_stdin()?,
    }
    Ok(())
}

//! `home21-authz` - inspect and validate authorization rules.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use home21_server::{config, observability, permissions::Authorizer};

#[derive(Debug, Parser)]
#[command(name = "home21-authz", version, about = "Inspect Home21 authorization rules")]
struct Cli {
    /// JSON rules file; the built-in table is used when unset
    #[arg(long, global = true, env = "AUTHZ_RULES_PATH")]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every role's effective permissions as JSON
    Matrix,
    /// Report roles that have less access than the role below them
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let mut config = config::Config::from_env()?;
    if let Some(path) = cli.rules {
        config.rules_path = Some(path);
    }
    observability::init_tracing(&config)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting home21-authz");

    match cli.command.unwrap_or(Command::Matrix) {
        Command::Matrix => {
            let authz = Authorizer::new(config.load_rules()?);
            let matrix = serde_json::to_string_pretty(&authz.permission_matrix())
                .context("Failed to serialize permission matrix")?;
            println!("{matrix}");
        }
        Command::Check => {
            let violations = config.check_rules()?;
            if !violations.is_empty() {
                for violation in &violations {
                    eprintln!("{violation}");
                }
                bail!("{} monotonicity violation(s)", violations.len());
            }
            println!("Rules OK");
        }
    }

    Ok(())
}

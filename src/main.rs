//! dynamo-migrate command-line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use dynamo_migrate::commands::{self, ExecuteAllRequest, ExecuteRequest};
use dynamo_migrate::config::{DEFAULT_CONFIG_FILE, Settings};
use dynamo_migrate::MigrationError;

/// Create and seed DynamoDB tables from migration files
#[derive(Parser, Debug)]
#[command(name = "dynamo-migrate")]
#[command(version, about = "Create and seed DynamoDB tables from migration files")]
struct Args {
    /// Service config file (serverless.yml style)
    #[arg(short = 'c', long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a migration template inside the migration directory
    Create {
        /// Name of the template
        #[arg(short = 'n', long)]
        name: String,
    },
    /// Execute a particular migration
    Execute {
        /// Name of the migration
        #[arg(short = 'n', long)]
        name: String,
        /// test | local | development | production
        #[arg(short = 's', long)]
        stage: String,
        /// Replace existing table
        #[arg(short = 'f', long)]
        force: bool,
        /// If not set, uses the region from the config file
        #[arg(short = 'r', long)]
        region: Option<String>,
    },
    /// Execute every migration in the migration directory
    ExecuteAll {
        /// test | local | development | production (default: local)
        #[arg(short = 's', long)]
        stage: Option<String>,
        /// Replace existing tables
        #[arg(short = 'f', long)]
        force: bool,
        /// If not set, uses the region from the config file
        #[arg(short = 'r', long)]
        region: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dynamo_migrate=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), MigrationError> {
    let settings = Settings::load(&args.config).await?;

    match args.command {
        Command::Create { name } => {
            let path = commands::create(&settings, &name).await?;
            println!("Created migration: {}", path.display());
        }
        Command::Execute {
            name,
            stage,
            force,
            region,
        } => {
            let request = ExecuteRequest {
                name,
                stage,
                force,
                region,
            };
            commands::execute(&settings, request).await?;
        }
        Command::ExecuteAll {
            stage,
            force,
            region,
        } => {
            let request = ExecuteAllRequest {
                stage,
                force,
                region,
            };
            let report = commands::execute_all(&settings, request).await?;
            println!(
                "{} migration(s): {} succeeded, {} failed",
                report.entries.len(),
                report.succeeded(),
                report.failed()
            );
        }
    }

    Ok(())
}

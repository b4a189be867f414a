//! Schema migration runner
//!
//! Usage:
//!   marketplace-migrate [--database-url <url>] run
//!   marketplace-migrate [--database-url <url>] status

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashSet;

use marketplace::{config::Config, db, logging};

#[derive(Parser, Debug)]
#[clap(name = "marketplace-migrate")]
#[clap(about = "Apply or inspect the marketplace database migrations")]
struct Args {
    /// Database connection URL (defaults to the loaded configuration)
    #[clap(short, long)]
    database_url: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply every pending migration
    Run,
    /// List migrations and whether they are applied
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_simple_logging();
    let args = Args::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = args.database_url {
        config.database.url = url;
    }
    config.database.pool_min_size = 0;
    config.database.pool_max_size = 1;

    let pool = db::create_pool(&config.database)
        .await
        .context("Failed to connect to database")?;

    match args.command {
        Command::Run => {
            db::run_migrations(&pool).await?;
            tracing::info!("Migrations applied");
        }
        Command::Status => {
            let applied: HashSet<i64> = sqlx::query_scalar::<_, i64>(
                "SELECT version FROM _sqlx_migrations WHERE success",
            )
            .fetch_all(&pool)
            .await
            .unwrap_or_default()
            .into_iter()
            .collect();

            for migration in db::MIGRATOR.iter() {
                let state = if applied.contains(&migration.version) {
                    "applied"
                } else {
                    "pending"
                };
                println!("{:>4}  {:<8} {}", migration.version, state, migration.description);
            }
        }
    }

    pool.close().await;
    Ok(())
}

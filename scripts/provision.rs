#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use homedash_store::{
    db::open_sqlite_pool, last_backup_status, migrate::apply_migrations, seed_all, ConfigDomain,
    ConfigStore,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "provision", about = "homedash store provisioning helper")]
struct Cli {
    /// Optional explicit DB path
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Apply pending migrations
    #[command(about, long_about = None)]
    Migrate,
    /// Apply migrations, then seed every domain's defaults
    #[command(about, long_about = None)]
    Seed,
    /// Show per-domain seed state and the last backup timestamp
    #[command(about, long_about = None)]
    Status,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("homedash.sqlite3")
}

#[tokio::main]
async fn main() -> Result<()> {
    homedash_store::logging::init();

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(default_db_path);

    let pool = open_sqlite_pool(&db_path)
        .await
        .with_context(|| format!("open database at {}", db_path.display()))?;

    match cli.cmd {
        Cmd::Migrate => {
            apply_migrations(&pool).await.context("apply migrations")?;
            println!("migrations applied");
        }
        Cmd::Seed => {
            apply_migrations(&pool).await.context("apply migrations")?;
            let store = ConfigStore::new(pool.clone());
            seed_all(&store).await.context("seed domains")?;
            println!("all domains seeded");
        }
        Cmd::Status => {
            apply_migrations(&pool).await.context("apply migrations")?;
            let store = ConfigStore::new(pool.clone());
            for domain in ConfigDomain::ALL {
                if domain.is_singleton() {
                    let seeded = store.get(*domain).await?.is_some();
                    println!(
                        "{:<18} {}",
                        domain.to_string(),
                        if seeded { "seeded" } else { "unseeded" }
                    );
                }
            }
            let status = last_backup_status(&store).await?;
            println!(
                "{:<18} {}",
                "lastBackup",
                status.last_backup.as_deref().unwrap_or("none")
            );
        }
    }

    pool.close().await;
    Ok(())
}

use anyhow::Result;
use serde_json::json;
use tempfile::tempdir;

use homedash_store::db::open_sqlite_pool;
use homedash_store::migrate::apply_migrations;
use homedash_store::{ConfigDomain, ConfigStore};

#[tokio::test]
async fn pool_opens_with_wal_and_pragmas() -> Result<()> {
    let dir = tempdir()?;
    let pool = open_sqlite_pool(&dir.path().join("homedash.sqlite3")).await?;

    let (journal_mode,): (String,) = sqlx::query_as("PRAGMA journal_mode;")
        .fetch_one(&pool)
        .await?;
    assert!(journal_mode.eq_ignore_ascii_case("wal"));

    let (synchronous,): (i64,) = sqlx::query_as("PRAGMA synchronous;")
        .fetch_one(&pool)
        .await?;
    assert_eq!(synchronous, 2, "synchronous must be FULL");

    let (foreign_keys,): (i64,) = sqlx::query_as("PRAGMA foreign_keys;")
        .fetch_one(&pool)
        .await?;
    assert_eq!(foreign_keys, 1);

    let (busy_timeout,): (i64,) = sqlx::query_as("PRAGMA busy_timeout;")
        .fetch_one(&pool)
        .await?;
    assert_eq!(busy_timeout, 5000);

    Ok(())
}

#[tokio::test]
async fn pool_creates_missing_parent_directories() -> Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("nested/data/homedash.sqlite3");

    let pool = open_sqlite_pool(&db_path).await?;
    apply_migrations(&pool).await?;

    assert!(db_path.exists());
    Ok(())
}

#[tokio::test]
async fn file_backed_store_round_trips_a_write() -> Result<()> {
    let dir = tempdir()?;
    let pool = open_sqlite_pool(&dir.path().join("homedash.sqlite3")).await?;
    apply_migrations(&pool).await?;

    let store = ConfigStore::new(pool);
    let mut fields = serde_json::Map::new();
    fields.insert("connected".into(), json!(true));
    store.upsert(ConfigDomain::PiholeConfig, fields).await?;

    let record = store.require(ConfigDomain::PiholeConfig).await?;
    assert_eq!(record.get("connected"), Some(&json!(true)));
    Ok(())
}

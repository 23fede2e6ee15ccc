use anyhow::Result;
use serde_json::{json, Value};

use homedash_store::{
    last_backup_status, latest_backup_timestamp, seed_all, AppError, ConfigDomain,
};

mod util;

fn event(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn fresh_system_has_no_last_backup() -> Result<()> {
    let store = util::temp_store().await;
    seed_all(&store).await?;

    assert!(latest_backup_timestamp(&store).await?.is_none());
    let status = last_backup_status(&store).await?;
    assert!(status.last_backup.is_none());
    assert_eq!(
        serde_json::to_string(&status)?,
        "{\"lastBackup\":null}"
    );
    Ok(())
}

#[tokio::test]
async fn latest_returns_greatest_created_at() -> Result<()> {
    let store = util::temp_store().await;

    let t1 = 1_700_000_000_000i64;
    let t2 = 1_700_000_100_000i64;
    let t3 = 1_700_000_200_000i64;
    for (ts, name) in [(t1, "a"), (t2, "b"), (t3, "c")] {
        store
            .append(ConfigDomain::Backups, event(json!({ "file_name": name, "created_at": ts })))
            .await?;
    }

    let latest = store.latest().await?.expect("ledger has events");
    assert_eq!(latest.created_at, t3);
    assert_eq!(latest.file_name.as_deref(), Some("c"));

    let instant = latest_backup_timestamp(&store).await?.unwrap();
    assert_eq!(instant.timestamp_millis(), t3);

    let status = last_backup_status(&store).await?;
    assert_eq!(
        status.last_backup.as_deref(),
        Some("2023-11-14T22:16:40.000Z")
    );
    Ok(())
}

#[tokio::test]
async fn append_never_replaces_prior_events() -> Result<()> {
    let store = util::temp_store().await;

    for i in 0..3 {
        store
            .append(ConfigDomain::Backups, event(json!({ "size_bytes": i * 1024 })))
            .await?;
    }
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM backups")
        .fetch_one(store.pool())
        .await?;
    assert_eq!(count, 3);
    Ok(())
}

#[tokio::test]
async fn equal_timestamps_fall_back_to_insertion_order() -> Result<()> {
    let store = util::temp_store().await;

    let ts = 1_700_000_000_000i64;
    store
        .append(ConfigDomain::Backups, event(json!({ "file_name": "first", "created_at": ts })))
        .await?;
    let second = store
        .append(ConfigDomain::Backups, event(json!({ "file_name": "second", "created_at": ts })))
        .await?;

    let latest = store.latest().await?.unwrap();
    assert_eq!(latest.id, second.id);
    Ok(())
}

#[tokio::test]
async fn generated_created_at_is_the_append_instant() -> Result<()> {
    let store = util::temp_store().await;

    let before = homedash_store::time::now_ms();
    let appended = store.append(ConfigDomain::Backups, event(json!({ "file_name": "auto" }))).await?;
    let after = homedash_store::time::now_ms();

    assert!(appended.created_at >= before);
    assert!(appended.created_at <= after);
    Ok(())
}

#[tokio::test]
async fn append_rejects_singleton_domains() {
    let store = util::temp_store().await;

    for domain in ConfigDomain::ALL.iter().filter(|d| d.is_singleton()) {
        let err = store
            .append(*domain, event(json!({ "file_name": "nope" })))
            .await
            .unwrap_err();
        assert_eq!(err.code(), AppError::LEDGER_ONLY);
        assert_eq!(
            err.context().get("domain"),
            Some(&domain.as_str().to_string())
        );
    }
}

#[tokio::test]
async fn append_validates_against_the_ledger_schema() {
    let store = util::temp_store().await;

    let err = store
        .append(ConfigDomain::Backups, event(json!({ "size_bytes": -1 })))
        .await
        .unwrap_err();
    assert_eq!(err.code(), AppError::VALIDATION);

    let err = store
        .append(ConfigDomain::Backups, event(json!({ "theme_preset": "dark" })))
        .await
        .unwrap_err();
    assert_eq!(err.code(), AppError::VALIDATION);
}

#[tokio::test]
async fn ledger_rows_survive_singleton_writes_elsewhere() -> Result<()> {
    let store = util::temp_store().await;

    store
        .append(ConfigDomain::Backups, event(json!({ "created_at": 1_700_000_000_000i64 })))
        .await?;
    let mut fields = serde_json::Map::new();
    fields.insert("connected".into(), json!(true));
    store.upsert(ConfigDomain::PiholeConfig, fields).await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM backups")
        .fetch_one(store.pool())
        .await?;
    assert_eq!(count, 1);
    Ok(())
}

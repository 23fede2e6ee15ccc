use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::ConfigStore;
use crate::time::{to_date, to_rfc3339};
use crate::AppResult;

/// External surface for "when did the last backup happen". An empty
/// ledger is a normal state, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastBackupStatus {
    pub last_backup: Option<String>,
}

/// Instant of the most recent backup event, or `None` when the ledger is
/// empty.
pub async fn latest_backup_timestamp(store: &ConfigStore) -> AppResult<Option<DateTime<Utc>>> {
    let latest = store.latest().await?;
    Ok(latest.map(|event| to_date(event.created_at)))
}

pub async fn last_backup_status(store: &ConfigStore) -> AppResult<LastBackupStatus> {
    let latest = store.latest().await?;
    Ok(LastBackupStatus {
        last_backup: latest.map(|event| to_rfc3339(event.created_at)),
    })
}

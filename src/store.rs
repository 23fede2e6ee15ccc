use std::sync::Arc;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{sqlite::SqliteRow, Column, Row, SqlitePool, TypeInfo, ValueRef};
use tokio::sync::Mutex;

use crate::db::run_in_tx;
use crate::domain::ConfigDomain;
use crate::id::new_uuid_v7;
use crate::schema::{domain_fields, validate_fields, FieldType};
use crate::time::now_ms;
use crate::{AppError, AppResult};

/// A domain's authoritative record: its fields plus the bookkeeping
/// columns (`id`, `created_at`, `updated_at`) the store stamps itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub domain: ConfigDomain,
    pub fields: Map<String, Value>,
}

impl ConfigRecord {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn created_at(&self) -> i64 {
        self.fields
            .get("created_at")
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    pub fn updated_at(&self) -> i64 {
        self.fields
            .get("updated_at")
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }
}

/// One appended backup event. The ledger is insertion-ordered and never
/// mutated.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BackupEvent {
    pub id: String,
    pub file_name: Option<String>,
    pub size_bytes: Option<i64>,
    pub created_at: i64,
}

/// Handle to the multi-domain settings store. Cloning is cheap; clones
/// share the pool and the per-domain write locks.
#[derive(Clone)]
pub struct ConfigStore {
    pool: SqlitePool,
    write_locks: Arc<Vec<Mutex<()>>>,
}

fn lock_ordinal(domain: ConfigDomain) -> usize {
    ConfigDomain::ALL
        .iter()
        .position(|d| *d == domain)
        .unwrap_or(0)
}

impl ConfigStore {
    pub fn new(pool: SqlitePool) -> Self {
        let write_locks = ConfigDomain::ALL.iter().map(|_| Mutex::new(())).collect();
        Self {
            pool,
            write_locks: Arc::new(write_locks),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Singleton read. `None` means the domain has not been seeded or
    /// written yet; defaults are the seeder's job, never fabricated here.
    pub async fn get(&self, domain: ConfigDomain) -> AppResult<Option<ConfigRecord>> {
        domain.require_singleton("get")?;
        let sql = format!("SELECT * FROM {} LIMIT 1", domain.table());
        let row = sqlx::query(&sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| {
                AppError::from(err)
                    .with_context("operation", "get")
                    .with_context("domain", domain.as_str())
            })?;
        Ok(row.map(|row| ConfigRecord {
            domain,
            fields: decode_row(domain, row),
        }))
    }

    /// Like [`get`](Self::get), but absence is an error.
    pub async fn require(&self, domain: ConfigDomain) -> AppResult<ConfigRecord> {
        self.get(domain).await?.ok_or_else(|| {
            AppError::new(AppError::NOT_FOUND, "Configuration domain has no record")
                .with_context("operation", "require")
                .with_context("domain", domain.as_str())
        })
    }

    /// Merge `fields` into the domain's single row, creating it when
    /// absent. The read-modify-write runs in one transaction under the
    /// domain's write lock; concurrent upserts to the same domain
    /// serialize, other domains proceed independently.
    pub async fn upsert(
        &self,
        domain: ConfigDomain,
        mut fields: Map<String, Value>,
    ) -> AppResult<ConfigRecord> {
        domain.require_singleton("upsert")?;
        fields.remove("id");
        fields.remove("created_at");
        fields.remove("updated_at");
        validate_fields(domain, &fields)?;

        let _guard = self.write_locks[lock_ordinal(domain)].lock().await;
        let table = domain.table();
        let now = now_ms();
        let fields_for_tx = fields.clone();
        let record_fields = run_in_tx(&self.pool, |tx| {
            async move {
                let existing: Option<String> =
                    sqlx::query_scalar(&format!("SELECT id FROM {table} LIMIT 1"))
                        .fetch_optional(&mut **tx)
                        .await?;

                let id = match existing {
                    Some(id) => {
                        let mut data = fields_for_tx;
                        data.insert("updated_at".into(), Value::from(now));
                        let cols: Vec<String> = data.keys().cloned().collect();
                        let set_clause: Vec<String> =
                            cols.iter().map(|c| format!("{c} = ?")).collect();
                        let sql =
                            format!("UPDATE {table} SET {} WHERE id = ?", set_clause.join(","));
                        let mut query = sqlx::query(&sql);
                        for c in &cols {
                            query = bind_value(query, &data[c]);
                        }
                        query.bind(&id).execute(&mut **tx).await?;
                        id
                    }
                    None => {
                        let mut data = fields_for_tx;
                        let id = new_uuid_v7();
                        data.insert("id".into(), Value::String(id.clone()));
                        data.insert("created_at".into(), Value::from(now));
                        data.insert("updated_at".into(), Value::from(now));
                        let cols: Vec<String> = data.keys().cloned().collect();
                        let placeholders: Vec<String> = cols.iter().map(|_| "?".into()).collect();
                        let sql = format!(
                            "INSERT INTO {table} ({}) VALUES ({})",
                            cols.join(","),
                            placeholders.join(",")
                        );
                        let mut query = sqlx::query(&sql);
                        for c in &cols {
                            query = bind_value(query, &data[c]);
                        }
                        query.execute(&mut **tx).await?;
                        id
                    }
                };

                let row = sqlx::query(&format!("SELECT * FROM {table} WHERE id = ?"))
                    .bind(&id)
                    .fetch_one(&mut **tx)
                    .await?;
                Ok::<_, sqlx::Error>(row)
            }
            .boxed()
        })
        .await
        .map_err(|err: sqlx::Error| {
            AppError::from(err)
                .with_context("operation", "upsert")
                .with_context("domain", domain.as_str())
        })?;

        tracing::debug!(
            target = "homedash",
            event = "config_upsert",
            domain = %domain,
            fields = fields.len()
        );

        Ok(ConfigRecord {
            domain,
            fields: decode_row(domain, record_fields),
        })
    }

    /// Append one event to the backup ledger. Prior events are never
    /// merged or replaced. `created_at` is generated unless the event
    /// carries one (deterministic fixtures do). Only the ledger domain
    /// accepts appends.
    pub async fn append(
        &self,
        domain: ConfigDomain,
        event: Map<String, Value>,
    ) -> AppResult<BackupEvent> {
        domain.require_ledger("append")?;
        validate_fields(domain, &event)?;

        let id = new_uuid_v7();
        let created_at = event
            .get("created_at")
            .and_then(Value::as_i64)
            .unwrap_or_else(now_ms);
        let file_name = event
            .get("file_name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let size_bytes = event.get("size_bytes").and_then(Value::as_i64);

        let _guard = self.write_locks[lock_ordinal(domain)].lock().await;
        sqlx::query(
            "INSERT INTO backups (id, file_name, size_bytes, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(file_name.as_deref())
        .bind(size_bytes)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            AppError::from(err)
                .with_context("operation", "append")
                .with_context("domain", domain.as_str())
        })?;

        tracing::info!(
            target = "homedash",
            event = "backup_appended",
            created_at,
            file_name = file_name.as_deref().unwrap_or("")
        );

        Ok(BackupEvent {
            id,
            file_name,
            size_bytes,
            created_at,
        })
    }

    /// Most recent backup event, or `None` for a fresh ledger. Equal
    /// timestamps fall back to insertion order (latest insert wins).
    pub async fn latest(&self) -> AppResult<Option<BackupEvent>> {
        sqlx::query_as::<_, BackupEvent>(
            "SELECT id, file_name, size_bytes, created_at FROM backups \
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            AppError::from(err)
                .with_context("operation", "latest")
                .with_context("domain", ConfigDomain::Backups.as_str())
        })
    }
}

fn row_to_value(row: &SqliteRow) -> Map<String, Value> {
    let mut map = Map::new();
    for col in row.columns() {
        let idx = col.ordinal();
        let v = row.try_get_raw(idx).ok();
        let val = match v {
            Some(raw) => {
                if raw.is_null() {
                    Value::Null
                } else {
                    match raw.type_info().name() {
                        "INTEGER" => row
                            .try_get::<i64, _>(idx)
                            .map(Value::from)
                            .unwrap_or(Value::Null),
                        "REAL" => row
                            .try_get::<f64, _>(idx)
                            .map(Value::from)
                            .unwrap_or(Value::Null),
                        _ => row
                            .try_get::<String, _>(idx)
                            .map(Value::from)
                            .unwrap_or(Value::Null),
                    }
                }
            }
            None => Value::Null,
        };
        map.insert(col.name().to_string(), val);
    }
    map
}

/// SQLite has no boolean column type, so re-apply the domain schema when
/// decoding: 0/1 integers come back out as the booleans that went in.
fn decode_row(domain: ConfigDomain, row: SqliteRow) -> Map<String, Value> {
    let mut map = row_to_value(&row);
    for spec in domain_fields(domain) {
        if spec.field_type == FieldType::Boolean {
            if let Some(Value::Number(n)) = map.get(spec.name) {
                if let Some(i) = n.as_i64() {
                    map.insert(spec.name.to_string(), Value::Bool(i != 0));
                }
            }
        }
    }
    map
}

fn bind_value<'q>(
    q: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    v: &Value,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    match v {
        Value::Null => q.bind(Option::<i64>::None),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(Option::<i64>::None)
            }
        }
        Value::Bool(b) => q.bind(*b as i64),
        Value::String(s) => q.bind(s.clone()),
        _ => q.bind(v.to_string()),
    }
}

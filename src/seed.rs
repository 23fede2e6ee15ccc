use serde_json::{json, Map, Value};

use crate::domain::ConfigDomain;
use crate::store::ConfigStore;
use crate::AppResult;

/// Per-domain constant defaults, applied only when a domain has zero
/// rows. The ledger has no defaults: a fresh system legitimately has no
/// backups yet.
pub fn default_set(domain: ConfigDomain) -> Map<String, Value> {
    let defaults = match domain {
        ConfigDomain::Appearance => json!({
            "theme_preset": "system",
            "primary_color": "#3b82f6",
            "background_color": "#0f172a",
            "screen_size": "desktop",
            "width": 1280,
            "height": 800,
        }),
        ConfigDomain::DatabaseSettings => json!({
            "auto_backup": true,
            "query_logging": false,
            "schema_validation": true,
            "performance_monitoring": false,
            "backup_path": "backups",
            "preset": "balanced",
        }),
        ConfigDomain::McpConfig => json!({
            "connected": false,
            "entities": "[]",
        }),
        ConfigDomain::McpSettings => json!({
            "connected": false,
        }),
        ConfigDomain::PiholeConfig => json!({
            "connected": false,
        }),
        ConfigDomain::Settings => json!({
            "mcp_connected": false,
        }),
        ConfigDomain::Backups => json!({}),
    };
    defaults.as_object().cloned().unwrap_or_default()
}

/// Idempotent default population for one domain. An existing record is
/// left untouched; seeding the ledger is a documented no-op.
pub async fn seed(store: &ConfigStore, domain: ConfigDomain) -> AppResult<()> {
    if !domain.is_singleton() {
        tracing::debug!(target = "homedash", event = "seed_skip_ledger", domain = %domain);
        return Ok(());
    }

    if store.get(domain).await?.is_some() {
        tracing::debug!(target = "homedash", event = "seed_skip_existing", domain = %domain);
        return Ok(());
    }

    store.upsert(domain, default_set(domain)).await?;
    tracing::info!(target = "homedash", event = "seed_applied", domain = %domain);
    Ok(())
}

/// Seed every domain, in declaration order. Safe to re-run on repeated
/// provisioning.
pub async fn seed_all(store: &ConfigStore) -> AppResult<()> {
    for domain in ConfigDomain::ALL {
        seed(store, *domain).await?;
    }
    Ok(())
}

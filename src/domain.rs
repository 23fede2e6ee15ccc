use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Identity of one configuration domain. Every store operation names its
/// domain explicitly; nothing is implied by table name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigDomain {
    #[serde(rename = "appearance")]
    Appearance,
    #[serde(rename = "databaseSettings")]
    DatabaseSettings,
    #[serde(rename = "mcpConfig")]
    McpConfig,
    #[serde(rename = "mcpSettings")]
    McpSettings,
    #[serde(rename = "piholeConfig")]
    PiholeConfig,
    #[serde(rename = "settings")]
    Settings,
    #[serde(rename = "backups")]
    Backups,
}

impl ConfigDomain {
    /// Seeding and provisioning iterate domains in this order.
    pub const ALL: &'static [ConfigDomain] = &[
        ConfigDomain::Appearance,
        ConfigDomain::DatabaseSettings,
        ConfigDomain::McpConfig,
        ConfigDomain::McpSettings,
        ConfigDomain::PiholeConfig,
        ConfigDomain::Settings,
        ConfigDomain::Backups,
    ];

    /// Wire name, matching the dashboard's camelCase domain identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigDomain::Appearance => "appearance",
            ConfigDomain::DatabaseSettings => "databaseSettings",
            ConfigDomain::McpConfig => "mcpConfig",
            ConfigDomain::McpSettings => "mcpSettings",
            ConfigDomain::PiholeConfig => "piholeConfig",
            ConfigDomain::Settings => "settings",
            ConfigDomain::Backups => "backups",
        }
    }

    /// SQLite table backing the domain.
    pub fn table(&self) -> &'static str {
        match self {
            ConfigDomain::Appearance => "appearance",
            ConfigDomain::DatabaseSettings => "database_settings",
            ConfigDomain::McpConfig => "mcp_config",
            ConfigDomain::McpSettings => "mcp_settings",
            ConfigDomain::PiholeConfig => "pihole_config",
            ConfigDomain::Settings => "settings",
            ConfigDomain::Backups => "backups",
        }
    }

    /// All domains hold at most one row except the backup ledger.
    pub fn is_singleton(&self) -> bool {
        !matches!(self, ConfigDomain::Backups)
    }

    pub(crate) fn require_singleton(&self, operation: &str) -> AppResult<()> {
        if self.is_singleton() {
            Ok(())
        } else {
            Err(AppError::new(
                AppError::SINGLETON_ONLY,
                "The backup ledger is append-only",
            )
            .with_context("operation", operation.to_string())
            .with_context("domain", self.as_str()))
        }
    }

    pub(crate) fn require_ledger(&self, operation: &str) -> AppResult<()> {
        if self.is_singleton() {
            Err(AppError::new(
                AppError::LEDGER_ONLY,
                "Only the backup ledger accepts appended events",
            )
            .with_context("operation", operation.to_string())
            .with_context("domain", self.as_str()))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for ConfigDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigDomain {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigDomain::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| {
                AppError::new("CONFIG/UNKNOWN_DOMAIN", "Unknown configuration domain")
                    .with_context("domain", s.to_string())
            })
    }
}

pub mod backup;
pub mod db;
pub mod domain;
pub mod error;
pub mod id;
pub mod logging;
pub mod migrate;
pub mod probe;
pub mod schema;
pub mod seed;
pub mod store;
pub mod time;

pub use backup::{last_backup_status, latest_backup_timestamp, LastBackupStatus};
pub use domain::ConfigDomain;
pub use error::{AppError, AppResult};
pub use probe::{ProbeAdapter, ProbeRequest};
pub use seed::{default_set, seed, seed_all};
pub use store::{BackupEvent, ConfigRecord, ConfigStore};

//! Backup artifacts: creation, restore and retention.

pub mod coordinator;
pub mod executor;
pub mod lock;
pub mod paths;
pub mod restore;
pub mod retention;

pub use coordinator::BackupCoordinator;
pub use executor::{DumpExecutor, MysqlClientTools, RestoreExecutor};
pub use paths::BackupTarget;
pub use restore::RestoreCoordinator;
pub use retention::RetentionManager;

//! Lyanna database maintenance library.
//!
//! Connectivity checks, schema inspection, backup/restore through the MySQL
//! client utilities, backup retention, table maintenance and a composite
//! health report.

pub mod backup;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod health;
pub mod shutdown;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, ConnectionConfig};
pub use utils::errors::ToolError;
pub type Result<T> = std::result::Result<T, ToolError>;

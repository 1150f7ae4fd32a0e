//! Composite database health reporting.

pub mod aggregator;
pub mod report;

pub use aggregator::check_health;
pub use report::{CheckResult, HealthReport};

//! Composite health check.
//!
//! Two phases: the connection probe gates everything; once it passes, the
//! `tables` and `size` probes run concurrently and each records its own
//! outcome whatever the other does.

use crate::db::connection::Connector;
use crate::db::{inspector, probe};
use crate::health::report::{CheckResult, HealthReport};
use tracing::{info, warn};

pub async fn check_health<C: Connector>(connector: &C) -> HealthReport {
    let server = match probe::test_connection(connector).await {
        Ok(server) => server,
        Err(e) => {
            warn!("Health gate failed: {}", e);
            return HealthReport::unreachable(e.to_string());
        }
    };

    let (tables, size) = tokio::join!(
        inspector::collection_counts(connector),
        inspector::storage_size_mb(connector),
    );

    let report = HealthReport::reachable(
        server,
        CheckResult::from_outcome(tables, "All collections present"),
        CheckResult::from_outcome(size, "Database size retrieved"),
    );
    info!(healthy = report.is_healthy(), "Health check finished");
    report
}

//! Schema inspection: per-collection record counts and total storage size.
//!
//! Queries only ever touch the [`Collection::ALL`] allow-list. A collection
//! absent from the live schema fails the whole count; it is never reported
//! as zero.

use crate::db::collection::{Collection, CollectionCount};
use crate::db::connection::{release, Connector, Session};
use crate::utils::{Result, ToolError};
use tracing::info;

pub async fn collection_counts<C: Connector>(connector: &C) -> Result<CollectionCount> {
    let mut session = connector.connect().await?;
    let result = count_all(&mut session).await;
    release(session).await;
    result
}

async fn count_all<S: Session>(session: &mut S) -> Result<CollectionCount> {
    let mut counts = Vec::with_capacity(Collection::ALL.len());
    for collection in Collection::ALL {
        counts.push((collection, session.count_records(collection).await?));
    }

    let counts = CollectionCount::from_counts(counts).map_err(|missing| {
        ToolError::Query(format!("no count collected for table {}", missing))
    })?;
    info!(total = counts.total(), "Collected record counts");
    Ok(counts)
}

/// Server-reported data+index size of the configured schema, in megabytes.
pub async fn storage_size_mb<C: Connector>(connector: &C) -> Result<u64> {
    let mut session = connector.connect().await?;
    let result = session.storage_size_mb().await;
    release(session).await;
    result
}

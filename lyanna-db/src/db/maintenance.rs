//! Per-collection optimize/compact pass.
//!
//! Fail-fast: the first failing collection stops the pass and the remaining
//! collections are not attempted.

use crate::db::collection::Collection;
use crate::db::connection::{release, Connector, Session};
use crate::utils::Result;
use tracing::info;

/// Optimize every allow-listed collection in order, returning the ones done.
pub async fn optimize_collections<C: Connector>(connector: &C) -> Result<Vec<Collection>> {
    let mut session = connector.connect().await?;
    let result = optimize_all(&mut session).await;
    release(session).await;
    result
}

async fn optimize_all<S: Session>(session: &mut S) -> Result<Vec<Collection>> {
    let mut done = Vec::with_capacity(Collection::ALL.len());
    for collection in Collection::ALL {
        session.optimize(collection).await?;
        info!(%collection, "Optimized");
        done.push(collection);
    }
    Ok(done)
}

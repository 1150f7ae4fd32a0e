//! Connection probe: open, ping, close.

use crate::db::connection::{release, Connector, Session};
use crate::utils::Result;
use serde::Serialize;
use tracing::info;

/// What a successful probe learned about the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    pub version: String,
}

/// Open a session, ping it and close it regardless of the ping outcome.
/// No retries.
pub async fn test_connection<C: Connector>(connector: &C) -> Result<ServerInfo> {
    let mut session = connector.connect().await?;
    let result = session.ping().await.map(|()| ServerInfo {
        version: session.server_version(),
    });
    release(session).await;

    if let Ok(info) = &result {
        info!(version = %info.version, "Database connection successful");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::FakeConnector;
    use crate::utils::ToolError;

    #[tokio::test]
    async fn test_probe_pings_and_closes() {
        let fake = FakeConnector::reachable();
        let info = test_connection(&fake).await.unwrap();
        assert_eq!(info.version, "8.0.36");
        assert_eq!(fake.calls(), vec!["connect", "ping", "close"]);
        assert_eq!(fake.sessions(), (1, 1));
    }

    #[tokio::test]
    async fn test_unreachable_is_connectivity_error() {
        let fake = FakeConnector::unreachable();
        let err = test_connection(&fake).await.unwrap_err();
        assert!(matches!(err, ToolError::Connectivity(_)));
        assert_eq!(fake.calls(), vec!["connect"]);
    }
}

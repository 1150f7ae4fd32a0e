//! Database access seam.
//!
//! Every component works against [`Connector`] / [`Session`] so that one
//! short-lived session is opened per call and released on every exit path.
//! [`MySqlConnector`] is the production implementation.

use crate::config::{ConnectionConfig, Timeouts};
use crate::db::collection::Collection;
use crate::utils::{Result, ToolError};
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, OptsBuilder};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Opens sessions against one configured database.
pub trait Connector: Send + Sync {
    type Session: Session;

    fn connect(&self) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// One open connection. Callers must hand it to [`release`] when done.
pub trait Session: Send {
    fn ping(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn server_version(&self) -> String;

    fn count_records(&mut self, collection: Collection)
        -> impl Future<Output = Result<u64>> + Send;

    /// Data plus index size of the configured schema, in whole megabytes.
    fn storage_size_mb(&mut self) -> impl Future<Output = Result<u64>> + Send;

    fn optimize(&mut self, collection: Collection) -> impl Future<Output = Result<()>> + Send;

    fn close(self) -> impl Future<Output = Result<()>> + Send;
}

/// Close a session, logging instead of failing the surrounding operation.
pub async fn release<S: Session>(session: S) {
    if let Err(e) = session.close().await {
        warn!("Failed to close database session: {}", e);
    }
}

const STORAGE_SIZE_QUERY: &str = "SELECT CAST(COALESCE(ROUND(SUM(data_length + index_length) / 1024 / 1024), 0) AS UNSIGNED) \
     FROM information_schema.tables WHERE table_schema = ?";

pub struct MySqlConnector {
    config: ConnectionConfig,
    timeouts: Timeouts,
}

impl MySqlConnector {
    pub fn new(config: ConnectionConfig, timeouts: Timeouts) -> Self {
        Self { config, timeouts }
    }

    fn opts(&self) -> OptsBuilder {
        let builder = OptsBuilder::default()
            .ip_or_hostname(self.config.host.clone())
            .tcp_port(self.config.port)
            .user(Some(self.config.user.clone()))
            .db_name(Some(self.config.database.clone()))
            .setup(vec!["SET NAMES utf8mb4"]);

        if self.config.password.is_empty() {
            builder
        } else {
            builder.pass(Some(self.config.password.clone()))
        }
    }
}

impl Connector for MySqlConnector {
    type Session = MySqlSession;

    async fn connect(&self) -> Result<MySqlSession> {
        debug!(
            host = %self.config.host,
            port = self.config.port,
            database = %self.config.database,
            "Opening database connection"
        );

        let conn = bounded(
            self.timeouts.connect,
            "failed to open database",
            Conn::new(self.opts()),
        )
        .await
        .map_err(ToolError::Connectivity)?;

        Ok(MySqlSession {
            conn,
            schema: self.config.database.clone(),
            query_timeout: self.timeouts.query,
        })
    }
}

pub struct MySqlSession {
    conn: Conn,
    schema: String,
    query_timeout: Duration,
}

impl Session for MySqlSession {
    async fn ping(&mut self) -> Result<()> {
        bounded(self.query_timeout, "failed to ping database", self.conn.ping())
            .await
            .map_err(ToolError::Connectivity)
    }

    fn server_version(&self) -> String {
        let (major, minor, patch) = self.conn.server_version();
        format!("{}.{}.{}", major, minor, patch)
    }

    async fn count_records(&mut self, collection: Collection) -> Result<u64> {
        let query = format!("SELECT COUNT(*) FROM `{}`", collection.table_name());
        debug!(%collection, "Counting records");

        let context = format!("failed to get count for table {}", collection);
        let count = bounded(
            self.query_timeout,
            &context,
            self.conn.query_first::<u64, _>(query),
        )
        .await
        .map_err(ToolError::Query)?;

        count.ok_or_else(|| ToolError::Query(format!("{}: no row returned", context)))
    }

    async fn storage_size_mb(&mut self) -> Result<u64> {
        debug!(schema = %self.schema, "Querying storage size");

        let size = bounded(
            self.query_timeout,
            "failed to get database size",
            self.conn
                .exec_first::<u64, _, _>(STORAGE_SIZE_QUERY, (self.schema.clone(),)),
        )
        .await
        .map_err(ToolError::Query)?;

        Ok(size.unwrap_or_default())
    }

    async fn optimize(&mut self, collection: Collection) -> Result<()> {
        let query = format!("OPTIMIZE TABLE `{}`", collection.table_name());
        debug!(%collection, "Optimizing table");

        let context = format!("failed to optimize table {}", collection);
        // Columns: Table, Op, Msg_type, Msg_text
        let rows: Vec<(String, String, String, String)> =
            bounded(self.query_timeout, &context, self.conn.query(query))
                .await
                .map_err(ToolError::Query)?;

        match rows
            .iter()
            .find(|(_, _, kind, _)| kind.eq_ignore_ascii_case("error"))
        {
            Some((_, _, _, text)) => Err(ToolError::Query(format!("{}: {}", context, text))),
            None => Ok(()),
        }
    }

    async fn close(self) -> Result<()> {
        bounded(
            self.query_timeout,
            "failed to close connection",
            self.conn.disconnect(),
        )
        .await
        .map_err(ToolError::Connectivity)
    }
}

/// Run a driver call under a deadline, flattening both failure modes into a
/// message prefixed with `context`.
async fn bounded<T, F>(limit: Duration, context: &str, fut: F) -> std::result::Result<T, String>
where
    F: Future<Output = std::result::Result<T, mysql_async::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(format!("{}: {}", context, e)),
        Err(_) => Err(format!("{}: timed out after {:?}", context, limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_port_connector() -> MySqlConnector {
        let config = ConnectionConfig {
            host: "127.0.0.1".to_string(),
            // Nothing listens on port 1 in test environments.
            port: 1,
            ..ConnectionConfig::default()
        };
        MySqlConnector::new(
            config,
            Timeouts {
                connect: Duration::from_secs(5),
                query: Duration::from_secs(5),
                process: Duration::from_secs(5),
            },
        )
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_is_connectivity_error() {
        let connector = closed_port_connector();
        match connector.connect().await {
            Err(ToolError::Connectivity(msg)) => assert!(msg.contains("failed to open database")),
            Err(other) => panic!("unexpected error kind: {other}"),
            Ok(_) => panic!("connection to a closed port succeeded"),
        }
    }

    #[tokio::test]
    async fn test_bounded_reports_timeout() {
        let result: std::result::Result<(), String> = bounded(
            Duration::from_millis(10),
            "failed to ping database",
            std::future::pending::<std::result::Result<(), mysql_async::Error>>(),
        )
        .await;

        let msg = result.unwrap_err();
        assert!(msg.starts_with("failed to ping database: timed out"));
    }

    #[test]
    fn test_opts_carry_connection_settings() {
        let connector = MySqlConnector::new(
            ConnectionConfig {
                host: "db.internal".to_string(),
                port: 3307,
                user: "blog".to_string(),
                password: "pw".to_string(),
                database: "lyanna_test".to_string(),
            },
            closed_port_connector().timeouts,
        );
        let opts = mysql_async::Opts::from(connector.opts());
        assert_eq!(opts.tcp_port(), 3307);
        assert_eq!(opts.user(), Some("blog"));
        assert_eq!(opts.pass(), Some("pw"));
        assert_eq!(opts.db_name(), Some("lyanna_test"));
    }
}

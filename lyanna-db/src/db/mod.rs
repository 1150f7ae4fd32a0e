//! Database access: the collection allow-list, the connector seam and the
//! operations built on it.

pub mod collection;
pub mod connection;
pub mod inspector;
pub mod maintenance;
pub mod probe;

#[cfg(test)]
pub(crate) mod testing;

pub use collection::{Collection, CollectionCount};
pub use connection::{Connector, MySqlConnector, Session};
pub use probe::ServerInfo;

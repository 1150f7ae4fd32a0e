//! Typed health report.
//!
//! The report can only be built through [`HealthReport::unreachable`] or
//! [`HealthReport::reachable`], so `connection` is always present, a failed
//! connection carries no other entries, and a passed connection always
//! carries both `tables` and `size`.

use crate::db::{CollectionCount, ServerInfo};
use serde::Serialize;

pub const CONNECTION: &str = "connection";
pub const TABLES: &str = "tables";
pub const SIZE: &str = "size";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckResult<T> {
    Ok { message: String, payload: T },
    Error { message: String },
}

impl<T> CheckResult<T> {
    pub fn ok(message: impl Into<String>, payload: T) -> Self {
        CheckResult::Ok {
            message: message.into(),
            payload,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        CheckResult::Error {
            message: message.into(),
        }
    }

    /// Record an outcome: the error's text on failure, `message` on success.
    pub fn from_outcome<E: std::fmt::Display>(
        outcome: Result<T, E>,
        message: impl Into<String>,
    ) -> Self {
        match outcome {
            Ok(payload) => Self::ok(message, payload),
            Err(e) => Self::error(e.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CheckResult::Ok { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            CheckResult::Ok { message, .. } | CheckResult::Error { message } => message,
        }
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            CheckResult::Ok { payload, .. } => Some(payload),
            CheckResult::Error { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    connection: CheckResult<ServerInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tables: Option<CheckResult<CollectionCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<CheckResult<u64>>,
}

impl HealthReport {
    /// The gate failed: only `connection` is reported.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            connection: CheckResult::error(message),
            tables: None,
            size: None,
        }
    }

    pub fn reachable(
        server: ServerInfo,
        tables: CheckResult<CollectionCount>,
        size: CheckResult<u64>,
    ) -> Self {
        Self {
            connection: CheckResult::ok("Database connection successful", server),
            tables: Some(tables),
            size: Some(size),
        }
    }

    pub fn connection(&self) -> &CheckResult<ServerInfo> {
        &self.connection
    }

    pub fn tables(&self) -> Option<&CheckResult<CollectionCount>> {
        self.tables.as_ref()
    }

    pub fn size(&self) -> Option<&CheckResult<u64>> {
        self.size.as_ref()
    }

    /// Names of the recorded checks, in report order.
    pub fn check_names(&self) -> Vec<&'static str> {
        let mut names = vec![CONNECTION];
        if self.tables.is_some() {
            names.push(TABLES);
        }
        if self.size.is_some() {
            names.push(SIZE);
        }
        names
    }

    /// True when every recorded check passed.
    pub fn is_healthy(&self) -> bool {
        self.connection.is_ok()
            && self.tables.as_ref().map_or(true, CheckResult::is_ok)
            && self.size.as_ref().map_or(true, CheckResult::is_ok)
    }
}

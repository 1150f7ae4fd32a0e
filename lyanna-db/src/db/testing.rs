//! In-memory [`Connector`] used by unit tests across the crate.

use crate::db::collection::Collection;
use crate::db::connection::{Connector, Session};
use crate::utils::{Result, ToolError};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct FakeState {
    pub unreachable: bool,
    pub missing: BTreeSet<Collection>,
    pub counts: HashMap<Collection, u64>,
    pub size_mb: u64,
    pub size_fails: bool,
    pub optimize_fails: Option<Collection>,
    /// Every call in the order it was made, e.g. `count users`.
    pub calls: Vec<String>,
    pub opened: usize,
    pub closed: usize,
}

#[derive(Clone, Default)]
pub struct FakeConnector {
    state: Arc<Mutex<FakeState>>,
}

impl FakeConnector {
    pub fn reachable() -> Self {
        Self::default()
    }

    pub fn unreachable() -> Self {
        let fake = Self::default();
        fake.with(|s| s.unreachable = true);
        fake
    }

    pub fn with(&self, f: impl FnOnce(&mut FakeState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// (opened, closed) session counts.
    pub fn sessions(&self) -> (usize, usize) {
        let state = self.state.lock().unwrap();
        (state.opened, state.closed)
    }
}

impl Connector for FakeConnector {
    type Session = FakeSession;

    async fn connect(&self) -> Result<FakeSession> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("connect".to_string());
        if state.unreachable {
            return Err(ToolError::Connectivity(
                "failed to open database: Connection refused (os error 111)".to_string(),
            ));
        }
        state.opened += 1;
        Ok(FakeSession {
            state: self.state.clone(),
        })
    }
}

pub struct FakeSession {
    state: Arc<Mutex<FakeState>>,
}

impl Session for FakeSession {
    async fn ping(&mut self) -> Result<()> {
        self.state.lock().unwrap().calls.push("ping".to_string());
        Ok(())
    }

    fn server_version(&self) -> String {
        "8.0.36".to_string()
    }

    async fn count_records(&mut self, collection: Collection) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("count {}", collection));
        if state.missing.contains(&collection) {
            return Err(ToolError::Query(format!(
                "failed to get count for table {}: Table 'lyanna.{}' doesn't exist",
                collection, collection
            )));
        }
        Ok(state.counts.get(&collection).copied().unwrap_or_default())
    }

    async fn storage_size_mb(&mut self) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("size".to_string());
        if state.size_fails {
            return Err(ToolError::Query("failed to get database size: denied".to_string()));
        }
        Ok(state.size_mb)
    }

    async fn optimize(&mut self, collection: Collection) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("optimize {}", collection));
        if state.optimize_fails == Some(collection) {
            return Err(ToolError::Query(format!(
                "failed to optimize table {}: lock wait timeout",
                collection
            )));
        }
        Ok(())
    }

    async fn close(self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("close".to_string());
        state.closed += 1;
        Ok(())
    }
}

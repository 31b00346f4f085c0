use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::gate::{Gate, GateMode};
use crate::store::FileStore;
use crate::tracker::Tracker;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct Session {
    pub workspace: Option<PathBuf>,
    pub tracker: Option<Tracker<FileStore>>,
    pub gate_mode: GateMode,
    pub passcode: String,
}

impl Session {
    pub fn new(gate_mode: GateMode, passcode: impl Into<String>) -> Self {
        Self {
            workspace: None,
            tracker: None,
            gate_mode,
            passcode: passcode.into(),
        }
    }

    /// Loads the workspace state. The admin gate starts locked again.
    pub fn open_workspace(&mut self, path: PathBuf) -> anyhow::Result<()> {
        std::fs::create_dir_all(&path)?;
        let store = FileStore::in_workspace(&path);
        debug!(state_file = %store.path().display(), "loading state");
        let gate = Gate::new(self.gate_mode, self.passcode.clone());
        self.tracker = Some(Tracker::open(store, gate));
        self.workspace = Some(path);
        Ok(())
    }
}

//! Persisted state: what the engine believes was last successfully applied

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use crate::config::{PluginRef, Tool};
use crate::error::{EngineError, Result};

/// Derive the state key from a tool's name and instance ID.
///
/// Deterministic and collision-free given unique instance IDs; used as the
/// identity everywhere config and state are correlated.
pub fn gen_state_key(name: &str, instance_id: &str) -> String {
    format!("{}_{}", name, instance_id)
}

/// State key for a declared tool
pub fn state_key(tool: &Tool) -> String {
    gen_state_key(&tool.name, &tool.instance_id)
}

/// Durable record of the last successful apply for one tool instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub name: String,
    pub plugin: PluginRef,

    /// Snapshot of the options that were applied, post-reference-resolution
    pub options: Value,

    /// Outputs returned by the plugin's Create/Update call
    #[serde(default)]
    pub resource: Value,
}

/// State map with stable iteration order
pub type StatesMap = BTreeMap<String, State>;

/// Durability seam for the state map.
///
/// The manager treats a returned `save` as durable; implementations decide
/// where the bytes go.
pub trait Backend: Send + Sync {
    fn load(&self) -> anyhow::Result<StatesMap>;
    fn save(&self, states: &StatesMap) -> anyhow::Result<()>;
}

/// Backend that keeps nothing; every load starts empty
pub struct MemoryBackend;

impl Backend for MemoryBackend {
    fn load(&self) -> anyhow::Result<StatesMap> {
        Ok(StatesMap::new())
    }

    fn save(&self, _states: &StatesMap) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Backend that persists the state map as pretty-printed JSON.
///
/// JSON rather than TOML because options and outputs are arbitrary trees
/// (nulls, heterogeneous arrays) that TOML cannot round-trip.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Backend for FileBackend {
    fn load(&self) -> anyhow::Result<StatesMap> {
        if !self.path.exists() {
            log::debug!("State file does not exist, starting empty");
            return Ok(StatesMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read state file: {}", self.path.display()))?;

        let states: StatesMap = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", self.path.display()))?;

        log::debug!("Loaded {} states from {}", states.len(), self.path.display());
        Ok(states)
    }

    fn save(&self, states: &StatesMap) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content =
            serde_json::to_string_pretty(states).context("Failed to serialize state map")?;
        fs::write(&self.path, &content)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))?;

        log::debug!("Saved state to {}", self.path.display());
        Ok(())
    }
}

/// In-memory state map backed by a pluggable durability backend.
///
/// Mutations persist through the backend before returning, so a crash
/// between changes loses nothing that was committed.
pub struct StateManager {
    states: StatesMap,
    backend: Box<dyn Backend>,
}

impl StateManager {
    /// Load existing states through the backend
    pub fn new(backend: Box<dyn Backend>) -> anyhow::Result<Self> {
        let states = backend.load()?;
        Ok(Self { states, backend })
    }

    /// Manager with no durability, for tests and dry runs
    pub fn in_memory() -> Self {
        Self {
            states: StatesMap::new(),
            backend: Box::new(MemoryBackend),
        }
    }

    pub fn get_state(&self, key: &str) -> Option<&State> {
        self.states.get(key)
    }

    /// Insert or replace the state for a key and persist
    pub fn add_state(&mut self, key: &str, state: State) -> Result<()> {
        self.states.insert(key.to_string(), state);
        self.backend
            .save(&self.states)
            .map_err(EngineError::StateCommit)
    }

    /// Remove the state for a key, if any, and persist.
    ///
    /// Removing an absent key is not an error; force-delete relies on that.
    pub fn delete_state(&mut self, key: &str) -> Result<()> {
        self.states.remove(key);
        self.backend
            .save(&self.states)
            .map_err(EngineError::StateCommit)
    }

    pub fn states_map(&self) -> &StatesMap {
        &self.states
    }

    /// Recorded outputs of a tool, for reference resolution
    pub fn get_outputs(&self, key: &str) -> Result<&serde_json::Map<String, Value>> {
        let state = self
            .states
            .get(key)
            .ok_or_else(|| EngineError::DependencyNotReady {
                key: key.to_string(),
            })?;

        state
            .resource
            .as_object()
            .ok_or_else(|| EngineError::OutputsNotAMap {
                key: key.to_string(),
            })
    }
}

//! Plugin capability lookup
//!
//! A plugin knows how to create, update, and delete one kind of tool. The
//! engine treats the registry as an opaque `(kind, version) -> callables`
//! lookup; what a plugin does behind those calls is its own business.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Tool;

/// Outputs returned by a plugin's Create/Update (the tool's `resource`)
pub type Outputs = Map<String, Value>;

/// Implementation of one tool kind
pub trait Plugin: Send + Sync {
    /// Bring the tool into existence; returns its outputs
    fn create(&self, tool: &Tool) -> anyhow::Result<Outputs>;

    /// Converge an existing tool to the given options.
    ///
    /// Must re-emit the full outputs map; partial merges are forbidden.
    fn update(&self, tool: &Tool) -> anyhow::Result<Outputs>;

    /// Remove the tool. Returning `true` for an already-absent resource is
    /// legitimate.
    fn delete(&self, tool: &Tool) -> anyhow::Result<bool>;

    /// Optional live-state read hook
    fn read(&self, _tool: &Tool) -> anyhow::Result<Option<Outputs>> {
        Ok(None)
    }

    /// Optional options check, run by the CLI before planning
    fn validate_options(&self, _options: &Value) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Resolves `(kind, version)` to a plugin implementation
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<(String, String), Arc<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: &str, version: &str, plugin: Arc<dyn Plugin>) {
        self.plugins
            .insert((kind.to_string(), version.to_string()), plugin);
    }

    pub fn get(&self, kind: &str, version: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins
            .get(&(kind.to_string(), version.to_string()))
            .cloned()
    }

    pub fn contains(&self, kind: &str, version: &str) -> bool {
        self.plugins
            .contains_key(&(kind.to_string(), version.to_string()))
    }
}

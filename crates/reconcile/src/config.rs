//! Desired-state configuration: tool declarations and validation

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::EngineError;

/// Selects a plugin implementation for a tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRef {
    pub kind: String,
    pub version: String,
}

/// A declared intent to manage one instance of an infrastructure capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Plugin kind name (e.g. "argocd", "harbor")
    pub name: String,

    /// Unique within a config
    #[serde(rename = "instanceID")]
    pub instance_id: String,

    /// References to other tools, each of the form `<name>.<instanceID>`
    #[serde(default)]
    pub depends_on: Vec<String>,

    pub plugin: PluginRef,

    /// Free-form tree; string leaves may carry `${{...}}` reference tokens
    #[serde(default = "Tool::default_options")]
    pub options: Value,
}

impl Tool {
    fn default_options() -> Value {
        Value::Object(serde_json::Map::new())
    }

    /// The reference other tools use in dependsOn to point at this one
    pub fn dependency_ref(&self) -> String {
        format!("{}.{}", self.name, self.instance_id)
    }
}

/// The user's desired world: a sequence of tool declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tools: Vec<Tool>,
}

impl Config {
    /// Structural checks per tool: non-empty name and instance ID,
    /// instance IDs unique across the config.
    ///
    /// All issues are accumulated; an empty vec means the config is sound.
    pub fn validate(&self) -> Vec<EngineError> {
        let mut errors = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for tool in &self.tools {
            if tool.name.is_empty() {
                errors.push(EngineError::Validation {
                    instance_id: tool.instance_id.clone(),
                    reason: "name must not be empty".to_string(),
                });
            }
            if tool.instance_id.is_empty() {
                errors.push(EngineError::Validation {
                    instance_id: tool.instance_id.clone(),
                    reason: "instanceID must not be empty".to_string(),
                });
            } else if !seen.insert(tool.instance_id.as_str()) {
                errors.push(EngineError::Validation {
                    instance_id: tool.instance_id.clone(),
                    reason: "instanceID declared more than once".to_string(),
                });
            }
        }

        errors
    }

    /// Referential checks across tools: every dependsOn entry must name a
    /// declared tool. An empty dependsOn is legal.
    pub fn validate_dependency(&self) -> Vec<EngineError> {
        let declared: HashSet<String> =
            self.tools.iter().map(|t| t.dependency_ref()).collect();

        let mut errors = Vec::new();
        for tool in &self.tools {
            for dep in &tool.depends_on {
                if !declared.contains(dep) {
                    errors.push(EngineError::DependencyMissing {
                        instance_id: tool.instance_id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        errors
    }
}

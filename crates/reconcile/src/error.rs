//! Error types for the reconciliation engine

use thiserror::Error;

/// Errors raised while validating, planning, resolving, or executing
#[derive(Error, Debug)]
pub enum EngineError {
    /// Structurally invalid tool declaration
    #[error("invalid tool {instance_id:?}: {reason}")]
    Validation { instance_id: String, reason: String },

    /// A dependsOn entry names a tool that is not declared in the config
    #[error("tool {instance_id} depends on {dependency}, which is not declared")]
    DependencyMissing {
        instance_id: String,
        dependency: String,
    },

    /// The dependency graph is not a DAG
    #[error("dependency cycle involving tool {instance_id}")]
    CyclicDependency { instance_id: String },

    /// A `${{...}}` token does not have the `instanceID.kind.outputs.key` shape
    #[error("malformed output reference: {reference}")]
    MalformedReference { reference: String },

    /// The referenced tool has no recorded state yet
    #[error("dependency {key} has no recorded state")]
    DependencyNotReady { key: String },

    /// The referenced output key is absent from the dependency's outputs
    #[error("output key {key:?} not found in outputs of {state_key}")]
    OutputKeyMissing { state_key: String, key: String },

    /// The recorded outputs of the referenced tool are not a map
    #[error("outputs of {key} are not a map")]
    OutputsNotAMap { key: String },

    /// A reference reads state of a tool the referencing tool never declared
    #[error("tool {instance_id} references {key} without declaring it in dependsOn")]
    UnacknowledgedDependency { instance_id: String, key: String },

    /// No plugin registered for the requested kind/version
    #[error("no plugin registered for {kind} {version}")]
    PluginNotFound { kind: String, version: String },

    /// Raised by a plugin's Create/Update/Delete, propagated verbatim
    #[error("plugin error: {0}")]
    Plugin(#[source] anyhow::Error),

    /// Persisting a state mutation failed
    #[error("state commit failed: {0}")]
    StateCommit(#[source] anyhow::Error),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

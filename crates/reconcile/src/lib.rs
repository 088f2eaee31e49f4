//! # Reconcile
//!
//! A reconciliation engine for declaratively managed infrastructure tools.
//!
//! A config declares a set of tool instances that should exist; plugins know
//! how to create, update, and delete one kind of tool; a durable state map
//! records what was last applied. The engine diffs config against state into
//! an ordered plan and executes it, committing state after every change so
//! that runs converge instead of restarting.
//!
//! ## Core Concepts
//!
//! - **Tool**: a declared intent to manage one instance of a capability
//! - **State**: the durable record of what was last successfully applied
//! - **Change**: one Create/Update/Delete against one tool, in plan order
//! - **Reference**: a `${{instanceID.kind.outputs.key}}` token in a tool's
//!   options, replaced at execution time by another tool's output
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{
//!     execute, plan_for_apply, Config, FileBackend, PluginRegistry, StateManager,
//! };
//!
//! let cfg: Config = toml::from_str(&std::fs::read_to_string("tools.toml")?)?;
//! let issues: Vec<_> = cfg
//!     .validate()
//!     .into_iter()
//!     .chain(cfg.validate_dependency())
//!     .collect();
//! assert!(issues.is_empty());
//!
//! let mut smgr = StateManager::new(Box::new(FileBackend::new("state.json")))?;
//! let registry = PluginRegistry::new(); // register plugins per kind
//!
//! let mut changes = plan_for_apply(&smgr, &cfg)?;
//! let errors = execute(&mut smgr, &registry, &cfg, &mut changes);
//! assert!(errors.is_empty());
//! ```
//!
//! Execution is single-threaded and sequential; the plan's dependency
//! ordering is sufficient for correctness without synchronization, and each
//! state commit is durable before the next change starts.

pub mod config;
pub mod error;
pub mod executor;
pub mod planner;
pub mod plugin;
pub mod resolver;
pub mod state;

// Re-export main types at crate root
pub use config::{Config, PluginRef, Tool};
pub use error::{EngineError, Result};
pub use executor::execute;
pub use planner::{
    plan_for_apply, plan_for_delete, plan_for_force_delete, Action, Change, ChangeResult,
};
pub use plugin::{Outputs, Plugin, PluginRegistry};
pub use resolver::resolve_options;
pub use state::{
    gen_state_key, state_key, Backend, FileBackend, MemoryBackend, State, StateManager, StatesMap,
};

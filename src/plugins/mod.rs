//! Builtin plugins shipped with the CLI
//!
//! Real deployments register their own plugins per tool kind; these two
//! cover the common cases of shelling out and managing plain files.

pub mod file;
pub mod shell;

use reconcile::PluginRegistry;
use std::sync::Arc;

/// Version the builtin plugins are registered under
pub const BUILTIN_VERSION: &str = "0.1.0";

/// Registry with the builtin plugins installed
pub fn builtin_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register("shell", BUILTIN_VERSION, Arc::new(shell::ShellPlugin));
    registry.register("file", BUILTIN_VERSION, Arc::new(file::FilePlugin));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = builtin_registry();
        assert!(registry.contains("shell", BUILTIN_VERSION));
        assert!(registry.contains("file", BUILTIN_VERSION));
        assert!(!registry.contains("helm", BUILTIN_VERSION));
    }
}

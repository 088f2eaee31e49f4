//! Change planning: diff desired config against persisted state
//!
//! Produces an ordered plan in which a tool's Create/Update comes after
//! everything it depends on, and a Delete comes before the Delete of
//! anything it depended on.

use serde_json::{Map, Value};
use std::fmt;

use crate::config::{Config, PluginRef, Tool};
use crate::error::{EngineError, Result};
use crate::state::{state_key, State, StateManager};

/// What the executor should do to a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Create => "Create",
            Action::Update => "Update",
            Action::Delete => "Delete",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of one executed change
#[derive(Debug, Clone)]
pub struct ChangeResult {
    pub succeeded: bool,
    pub error: Option<String>,
    /// RFC 3339 timestamp of when the change finished
    pub time: String,
    pub return_value: Map<String, Value>,
}

/// One atomic operation against one tool
#[derive(Debug, Clone)]
pub struct Change {
    pub tool: Tool,
    pub action: Action,
    pub description: String,
    /// Populated by the executor
    pub result: Option<ChangeResult>,
}

impl Change {
    fn new(tool: Tool, action: Action) -> Self {
        let description = format!(
            "{} {} ({}/{})",
            action, tool.instance_id, tool.plugin.kind, tool.plugin.version
        );
        Self {
            tool,
            action,
            description,
            result: None,
        }
    }

    /// Key under which a failure of this change is recorded
    pub fn error_key(&self) -> String {
        format!("{}-{}", self.tool.name, self.action)
    }
}

/// Plan for `apply`: Create missing tools, Update drifted ones, Delete
/// states that no longer correspond to any declared tool.
pub fn plan_for_apply(smgr: &StateManager, cfg: &Config) -> Result<Vec<Change>> {
    let mut changes = Vec::new();

    for &idx in &topo_order(cfg, Direction::Forward)? {
        let tool = &cfg.tools[idx];
        match smgr.get_state(&state_key(tool)) {
            None => changes.push(Change::new(tool.clone(), Action::Create)),
            Some(state) => {
                if state.plugin.version != tool.plugin.version || state.options != tool.options {
                    changes.push(Change::new(tool.clone(), Action::Update));
                }
            }
        }
    }

    // Orphans: state entries with no declared counterpart
    for (key, state) in smgr.states_map() {
        let declared = cfg.tools.iter().any(|t| state_key(t) == *key);
        if !declared {
            changes.push(Change::new(synthesize_tool(key, state), Action::Delete));
        }
    }

    log_plan(&changes);
    Ok(changes)
}

/// Plan for `delete`: Delete every declared tool that has recorded state
pub fn plan_for_delete(smgr: &StateManager, cfg: &Config) -> Result<Vec<Change>> {
    let mut changes = Vec::new();

    for &idx in &topo_order(cfg, Direction::Reverse)? {
        let tool = &cfg.tools[idx];
        if smgr.get_state(&state_key(tool)).is_some() {
            changes.push(Change::new(tool.clone(), Action::Delete));
        }
    }

    log_plan(&changes);
    Ok(changes)
}

/// Plan for `delete --force`: Delete every declared tool, state or not
pub fn plan_for_force_delete(_smgr: &StateManager, cfg: &Config) -> Result<Vec<Change>> {
    let mut changes = Vec::new();

    for &idx in &topo_order(cfg, Direction::Reverse)? {
        changes.push(Change::new(cfg.tools[idx].clone(), Action::Delete));
    }

    log_plan(&changes);
    Ok(changes)
}

/// Reconstruct a tool from its state record so an orphan can be deleted.
///
/// The instance ID is recovered from the state key; the state record does
/// not carry it separately.
fn synthesize_tool(key: &str, state: &State) -> Tool {
    let instance_id = key
        .strip_prefix(&format!("{}_", state.name))
        .unwrap_or(key)
        .to_string();

    Tool {
        name: state.name.clone(),
        instance_id,
        depends_on: Vec::new(),
        plugin: PluginRef {
            kind: state.plugin.kind.clone(),
            version: state.plugin.version.clone(),
        },
        options: state.options.clone(),
    }
}

fn log_plan(changes: &[Change]) {
    log::debug!("Changes for the plan:");
    for change in changes {
        log::debug!("  {}", change.description);
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// Dependencies first (Create/Update)
    Forward,
    /// Dependents first (Delete)
    Reverse,
}

/// Topological order over the config's tools via Kahn's algorithm.
///
/// Tools live in an arena slice; edges are index pairs. Zero-indegree
/// tools are drained a layer at a time, in declaration order within each
/// layer, so the output is stable for a given config.
fn topo_order(cfg: &Config, direction: Direction) -> Result<Vec<usize>> {
    let tools = &cfg.tools;
    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); tools.len()];
    let mut indegree = vec![0usize; tools.len()];

    for (i, tool) in tools.iter().enumerate() {
        for dep in &tool.depends_on {
            let j = tools
                .iter()
                .position(|t| t.dependency_ref() == *dep)
                .ok_or_else(|| EngineError::DependencyMissing {
                    instance_id: tool.instance_id.clone(),
                    dependency: dep.clone(),
                })?;

            let (from, to) = match direction {
                Direction::Forward => (j, i),
                Direction::Reverse => (i, j),
            };
            edges[from].push(to);
            indegree[to] += 1;
        }
    }

    let mut order = Vec::with_capacity(tools.len());
    let mut placed = vec![false; tools.len()];

    while order.len() < tools.len() {
        let layer: Vec<usize> = (0..tools.len())
            .filter(|&i| !placed[i] && indegree[i] == 0)
            .collect();

        if layer.is_empty() {
            // Everything unplaced is on a cycle; report the first by
            // declaration order.
            let stuck = (0..tools.len())
                .find(|&i| !placed[i])
                .unwrap_or_default();
            return Err(EngineError::CyclicDependency {
                instance_id: tools[stuck].instance_id.clone(),
            });
        }

        for &i in &layer {
            placed[i] = true;
            for &target in &edges[i] {
                indegree[target] -= 1;
            }
            order.push(i);
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool(name: &str, instance_id: &str, deps: &[&str]) -> Tool {
        Tool {
            name: name.to_string(),
            instance_id: instance_id.to_string(),
            depends_on: deps.iter().map(|d| d.to_string()).collect(),
            plugin: PluginRef {
                kind: name.to_string(),
                version: "0.1.0".to_string(),
            },
            options: json!({}),
        }
    }

    fn state_for(tool: &Tool) -> State {
        State {
            name: tool.name.clone(),
            plugin: tool.plugin.clone(),
            options: tool.options.clone(),
            resource: json!({}),
        }
    }

    fn ids(changes: &[Change]) -> Vec<(String, Action)> {
        changes
            .iter()
            .map(|c| (c.tool.instance_id.clone(), c.action))
            .collect()
    }

    #[test]
    fn test_apply_with_empty_state() {
        let cfg = Config {
            tools: vec![
                tool("argocd", "argocd", &[]),
                tool("argocdapp", "argocdapp", &["argocd.argocd"]),
            ],
        };
        let smgr = StateManager::in_memory();

        let changes = plan_for_apply(&smgr, &cfg).unwrap();
        assert_eq!(
            ids(&changes),
            vec![
                ("argocd".to_string(), Action::Create),
                ("argocdapp".to_string(), Action::Create),
            ]
        );
    }

    #[test]
    fn test_apply_dependency_ordering() {
        // Declared out of order on purpose
        let cfg = Config {
            tools: vec![
                tool("argocdapp", "app", &["argocd.core"]),
                tool("argocd", "core", &[]),
            ],
        };
        let smgr = StateManager::in_memory();

        let changes = plan_for_apply(&smgr, &cfg).unwrap();
        assert_eq!(
            ids(&changes),
            vec![
                ("core".to_string(), Action::Create),
                ("app".to_string(), Action::Create),
            ]
        );
    }

    #[test]
    fn test_apply_identical_state_plans_nothing() {
        let cfg = Config {
            tools: vec![tool("argocd", "dev", &[])],
        };
        let mut smgr = StateManager::in_memory();
        smgr.add_state("argocd_dev", state_for(&cfg.tools[0])).unwrap();

        assert!(plan_for_apply(&smgr, &cfg).unwrap().is_empty());
    }

    #[test]
    fn test_apply_version_drift_plans_update() {
        let cfg = Config {
            tools: vec![tool("argocd", "dev", &[])],
        };
        let mut drifted = state_for(&cfg.tools[0]);
        drifted.plugin.version = "0.0.9".to_string();

        let mut smgr = StateManager::in_memory();
        smgr.add_state("argocd_dev", drifted).unwrap();

        let changes = plan_for_apply(&smgr, &cfg).unwrap();
        assert_eq!(ids(&changes), vec![("dev".to_string(), Action::Update)]);
    }

    #[test]
    fn test_apply_options_drift_plans_update() {
        let mut declared = tool("argocd", "dev", &[]);
        declared.options = json!({"replicas": 3});
        let mut smgr = StateManager::in_memory();
        let mut old = state_for(&declared);
        old.options = json!({"replicas": 2});
        smgr.add_state("argocd_dev", old).unwrap();

        let cfg = Config {
            tools: vec![declared],
        };
        let changes = plan_for_apply(&smgr, &cfg).unwrap();
        assert_eq!(ids(&changes), vec![("dev".to_string(), Action::Update)]);
    }

    #[test]
    fn test_apply_orphan_state_plans_delete_last() {
        let cfg = Config {
            tools: vec![tool("argocd", "dev", &[])],
        };
        let mut smgr = StateManager::in_memory();
        smgr.add_state("foo_bar", state_for(&tool("foo", "bar", &[])))
            .unwrap();

        let changes = plan_for_apply(&smgr, &cfg).unwrap();
        assert_eq!(
            ids(&changes),
            vec![
                ("dev".to_string(), Action::Create),
                ("bar".to_string(), Action::Delete),
            ]
        );
        // Synthesized from the state record
        assert_eq!(changes[1].tool.name, "foo");
    }

    #[test]
    fn test_delete_reverse_ordering() {
        let cfg = Config {
            tools: vec![
                tool("argocd", "core", &[]),
                tool("argocdapp", "app", &["argocd.core"]),
            ],
        };
        let mut smgr = StateManager::in_memory();
        smgr.add_state("argocd_core", state_for(&cfg.tools[0])).unwrap();
        smgr.add_state("argocdapp_app", state_for(&cfg.tools[1])).unwrap();

        let changes = plan_for_delete(&smgr, &cfg).unwrap();
        assert_eq!(
            ids(&changes),
            vec![
                ("app".to_string(), Action::Delete),
                ("core".to_string(), Action::Delete),
            ]
        );
    }

    #[test]
    fn test_delete_skips_stateless_tools() {
        let cfg = Config {
            tools: vec![tool("argocd", "core", &[]), tool("harbor", "reg", &[])],
        };
        let mut smgr = StateManager::in_memory();
        smgr.add_state("argocd_core", state_for(&cfg.tools[0])).unwrap();

        let changes = plan_for_delete(&smgr, &cfg).unwrap();
        assert_eq!(ids(&changes), vec![("core".to_string(), Action::Delete)]);
    }

    #[test]
    fn test_force_delete_includes_stateless_tools() {
        let cfg = Config {
            tools: vec![tool("argocd", "core", &[]), tool("harbor", "reg", &[])],
        };
        let smgr = StateManager::in_memory();

        let changes = plan_for_force_delete(&smgr, &cfg).unwrap();
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.action == Action::Delete));
    }

    #[test]
    fn test_cycle_detected() {
        let cfg = Config {
            tools: vec![
                tool("a", "a", &["b.b"]),
                tool("b", "b", &["a.a"]),
            ],
        };
        let smgr = StateManager::in_memory();

        assert!(matches!(
            plan_for_apply(&smgr, &cfg),
            Err(EngineError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let cfg = Config {
            tools: vec![tool("a", "a", &["a.a"])],
        };
        let smgr = StateManager::in_memory();

        assert!(matches!(
            plan_for_apply(&smgr, &cfg),
            Err(EngineError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn test_missing_dependency_surfaces_when_validation_skipped() {
        let cfg = Config {
            tools: vec![tool("a", "a", &["ghost.ghost"])],
        };
        let smgr = StateManager::in_memory();

        assert!(matches!(
            plan_for_apply(&smgr, &cfg),
            Err(EngineError::DependencyMissing { .. })
        ));
    }

    #[test]
    fn test_declaration_order_within_layer() {
        let cfg = Config {
            tools: vec![
                tool("c", "c", &[]),
                tool("a", "a", &[]),
                tool("b", "b", &["c.c", "a.a"]),
            ],
        };
        let smgr = StateManager::in_memory();

        let changes = plan_for_apply(&smgr, &cfg).unwrap();
        assert_eq!(
            ids(&changes),
            vec![
                ("c".to_string(), Action::Create),
                ("a".to_string(), Action::Create),
                ("b".to_string(), Action::Create),
            ]
        );
    }

    #[test]
    fn test_error_key_format() {
        let change = Change::new(tool("argocd", "dev", &[]), Action::Create);
        assert_eq!(change.error_key(), "argocd-Create");
    }
}

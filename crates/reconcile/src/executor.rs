//! Plan execution: dispatch changes through plugins and commit state
//!
//! One change at a time, in plan order. A failed change is recorded and
//! skipped over; later changes keep going, so independent tools make
//! progress even when something breaks.

use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::{Config, Tool};
use crate::error::{EngineError, Result};
use crate::planner::{Action, Change, ChangeResult};
use crate::plugin::{Outputs, PluginRegistry};
use crate::resolver::resolve_options;
use crate::state::{state_key, State, StateManager};

/// Apply the plan. Returns a map of `"<toolName>-<action>"` (or
/// `"handle-result"` for commit failures) to the error for every change
/// that failed; an empty map means total success.
pub fn execute(
    smgr: &mut StateManager,
    registry: &PluginRegistry,
    cfg: &Config,
    changes: &mut [Change],
) -> BTreeMap<String, EngineError> {
    let mut errors = BTreeMap::new();

    log::info!("Start executing the plan.");
    let total = changes.len();
    log::info!("Changes count: {}.", total);

    for (i, change) in changes.iter_mut().enumerate() {
        log::info!("Processing progress: {}/{}.", i + 1, total);
        log::info!(
            "Processing: {} ({}) -> {} ...",
            change.tool.name,
            change.tool.plugin.kind,
            change.action
        );

        let outcome = run_change(smgr, registry, cfg, change);

        let result = match outcome {
            Ok((true, return_value)) => ChangeResult {
                succeeded: true,
                error: None,
                time: Utc::now().to_rfc3339(),
                return_value,
            },
            Ok((false, _)) => {
                let err = EngineError::Plugin(anyhow::anyhow!(
                    "plugin reported delete failure for {}",
                    change.tool.instance_id
                ));
                let result = ChangeResult {
                    succeeded: false,
                    error: Some(err.to_string()),
                    time: Utc::now().to_rfc3339(),
                    return_value: Outputs::new(),
                };
                errors.insert(change.error_key(), err);
                result
            }
            Err(err) => {
                let result = ChangeResult {
                    succeeded: false,
                    error: Some(err.to_string()),
                    time: Utc::now().to_rfc3339(),
                    return_value: Outputs::new(),
                };
                errors.insert(change.error_key(), err);
                result
            }
        };

        if let Err(err) = commit_result(smgr, &change.tool, change.action, &result) {
            errors.insert("handle-result".to_string(), err);
        }

        change.result = Some(result);
    }
    log::info!("Processing done.");

    errors
}

/// Resolve references and dispatch one change through its plugin.
///
/// Returns `(succeeded, outputs)`. A resolution error skips the plugin
/// call entirely; the plugin never sees unresolved options.
fn run_change(
    smgr: &StateManager,
    registry: &PluginRegistry,
    cfg: &Config,
    change: &mut Change,
) -> Result<(bool, Outputs)> {
    if matches!(change.action, Action::Create | Action::Update) {
        resolve_options(smgr, cfg, &mut change.tool)?;
    }

    let plugin = registry
        .get(&change.tool.plugin.kind, &change.tool.plugin.version)
        .ok_or_else(|| EngineError::PluginNotFound {
            kind: change.tool.plugin.kind.clone(),
            version: change.tool.plugin.version.clone(),
        })?;

    match change.action {
        Action::Create => plugin
            .create(&change.tool)
            .map(|outputs| (true, outputs))
            .map_err(EngineError::Plugin),
        Action::Update => plugin
            .update(&change.tool)
            .map(|outputs| (true, outputs))
            .map_err(EngineError::Plugin),
        Action::Delete => plugin
            .delete(&change.tool)
            .map(|succeeded| (succeeded, Outputs::new()))
            .map_err(EngineError::Plugin),
    }
}

/// Commit the outcome of a change to the state manager.
///
/// Failures leave prior state untouched. A successful Delete removes the
/// entry; a successful Create or Update both land as an add, which
/// replaces any existing entry.
fn commit_result(
    smgr: &mut StateManager,
    tool: &Tool,
    action: Action,
    result: &ChangeResult,
) -> Result<()> {
    if !result.succeeded {
        log::error!(
            "The tool {} ({}) {} failed.",
            tool.name,
            tool.plugin.kind,
            action
        );
        return Ok(());
    }

    let key = state_key(tool);

    if action == Action::Delete {
        smgr.delete_state(&key)?;
        log::info!("Tool {} ({}) delete done.", tool.name, tool.plugin.kind);
        return Ok(());
    }

    smgr.add_state(
        &key,
        State {
            name: tool.name.clone(),
            plugin: tool.plugin.clone(),
            options: tool.options.clone(),
            resource: Value::Object(result.return_value.clone()),
        },
    )?;
    log::info!(
        "Tool {} ({}) {} done.",
        tool.name,
        tool.plugin.kind,
        action
    );
    Ok(())
}

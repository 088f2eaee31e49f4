//! Output reference resolution
//!
//! A string leaf whose entire value is `${{instanceID.kind.outputs.key}}`
//! is replaced, just before execution, with the named output of a tool
//! that already ran. Substring references are not supported, and resolved
//! values are not re-scanned.

use serde_json::Value;
use std::collections::HashSet;

use crate::config::{Config, Tool};
use crate::error::{EngineError, Result};
use crate::state::{gen_state_key, StateManager};

const REF_PREFIX: &str = "${{";
const REF_SUFFIX: &str = "}}";

/// Expected dot-separated segments: instanceID, kind, "outputs", key
const REF_SEGMENTS: usize = 4;

/// Resolve every reference token in a tool's options tree, in place.
///
/// A tool may only read outputs of tools in its transitive dependsOn
/// closure; anything else is an unacknowledged dependency.
pub fn resolve_options(smgr: &StateManager, cfg: &Config, tool: &mut Tool) -> Result<()> {
    let allowed = transitive_deps(cfg, tool);
    let Tool {
        instance_id,
        options,
        ..
    } = tool;
    fill_ref_values(smgr, &allowed, instance_id, options)
}

/// Walk the options tree, descending into maps and sequences, substituting
/// whole-string reference leaves. Single pass.
fn fill_ref_values(
    smgr: &StateManager,
    allowed: &HashSet<String>,
    instance_id: &str,
    value: &mut Value,
) -> Result<()> {
    match value {
        Value::String(leaf) => {
            if let Some(reference) = strip_ref(leaf) {
                log::debug!("Resolving reference: {}", reference);
                *value = lookup_output(smgr, allowed, instance_id, &reference)?;
            }
        }
        Value::Object(map) => {
            for child in map.values_mut() {
                fill_ref_values(smgr, allowed, instance_id, child)?;
            }
        }
        Value::Array(items) => {
            for child in items.iter_mut() {
                fill_ref_values(smgr, allowed, instance_id, child)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Extract `abc` from `${{abc}}` or `${{ abc }}`; None when the leaf is
/// not wrapped as a reference.
fn strip_ref(leaf: &str) -> Option<String> {
    leaf.strip_prefix(REF_PREFIX)
        .and_then(|rest| rest.strip_suffix(REF_SUFFIX))
        .map(|inner| inner.trim().to_string())
}

fn lookup_output(
    smgr: &StateManager,
    allowed: &HashSet<String>,
    instance_id: &str,
    reference: &str,
) -> Result<Value> {
    let segments: Vec<&str> = reference.split('.').collect();
    if segments.len() != REF_SEGMENTS
        || segments[2] != "outputs"
        || segments.iter().any(|s| s.is_empty())
    {
        return Err(EngineError::MalformedReference {
            reference: reference.to_string(),
        });
    }

    let (ref_instance, ref_kind, key) = (segments[0], segments[1], segments[3]);
    let state_key = gen_state_key(ref_kind, ref_instance);

    if !allowed.contains(&format!("{}.{}", ref_kind, ref_instance)) {
        return Err(EngineError::UnacknowledgedDependency {
            instance_id: instance_id.to_string(),
            key: state_key,
        });
    }

    let outputs = smgr.get_outputs(&state_key)?;
    outputs
        .get(key)
        .cloned()
        .ok_or_else(|| EngineError::OutputKeyMissing {
            state_key,
            key: key.to_string(),
        })
}

/// Transitive closure of a tool's dependsOn entries
fn transitive_deps(cfg: &Config, tool: &Tool) -> HashSet<String> {
    let mut seen = HashSet::new();
    let mut queue: Vec<&str> = tool.depends_on.iter().map(String::as_str).collect();

    while let Some(dep) = queue.pop() {
        if !seen.insert(dep.to_string()) {
            continue;
        }
        if let Some(t) = cfg.tools.iter().find(|t| t.dependency_ref() == dep) {
            queue.extend(t.depends_on.iter().map(String::as_str));
        }
    }

    seen
}

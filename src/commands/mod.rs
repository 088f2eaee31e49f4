//! CLI commands: apply, delete, plan, validate

pub mod apply;
pub mod delete;
pub mod plan;
pub mod validate;

use anyhow::{bail, Result};
use reconcile::{Change, Config, EngineError, FileBackend, StateManager};
use std::collections::BTreeMap;

use crate::config;
use crate::ui;
use crate::Context;

/// Load the config and run both validators; any issue aborts before the
/// planner sees the config.
pub fn load_validated_config(ctx: &Context) -> Result<Config> {
    let cfg = config::load(&ctx.config_path)?;

    let issues: Vec<EngineError> = cfg
        .validate()
        .into_iter()
        .chain(cfg.validate_dependency())
        .collect();

    if !issues.is_empty() {
        for issue in &issues {
            ui::error(&issue.to_string());
        }
        bail!("config has {} validation issue(s)", issues.len());
    }

    Ok(cfg)
}

/// Open the state manager over the file backend
pub fn open_state(ctx: &Context) -> Result<StateManager> {
    StateManager::new(Box::new(FileBackend::new(&ctx.state_path)))
}

/// Confirm with user
pub fn confirm_proceed() -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()?;

    Ok(confirmed)
}

/// Report outcomes; the process exits non-zero iff any change failed
pub fn finish(changes: &[Change], errors: &BTreeMap<String, EngineError>) -> Result<()> {
    ui::display_outcome(changes, errors);

    if !errors.is_empty() {
        bail!("{} change(s) failed", errors.len());
    }
    Ok(())
}

//! `rigger validate` - check the config without touching anything

use anyhow::{bail, Result};
use reconcile::EngineError;

use crate::config;
use crate::plugins;
use crate::ui;
use crate::Context;

pub fn run(ctx: &Context) -> Result<()> {
    let cfg = config::load(&ctx.config_path)?;
    let registry = plugins::builtin_registry();

    let mut issues: Vec<String> = cfg
        .validate()
        .into_iter()
        .chain(cfg.validate_dependency())
        .map(|e: EngineError| e.to_string())
        .collect();

    // Per-plugin option checks, where the plugin is known
    for tool in &cfg.tools {
        if let Some(plugin) = registry.get(&tool.plugin.kind, &tool.plugin.version)
            && let Err(err) = plugin.validate_options(&tool.options)
        {
            issues.push(format!("tool {}: {}", tool.instance_id, err));
        }
    }

    if issues.is_empty() {
        ui::success(&format!("Config is valid ({} tools)", cfg.tools.len()));
        return Ok(());
    }

    for issue in &issues {
        ui::error(issue);
    }
    bail!("config has {} validation issue(s)", issues.len());
}

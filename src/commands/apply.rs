//! `rigger apply` - converge the world to the config

use anyhow::Result;
use reconcile::{execute, plan_for_apply};

use crate::cli::ApplyArgs;
use crate::plugins;
use crate::ui;
use crate::Context;

use super::{confirm_proceed, finish, load_validated_config, open_state};

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let cfg = load_validated_config(ctx)?;
    let mut smgr = open_state(ctx)?;
    let registry = plugins::builtin_registry();

    let mut changes = plan_for_apply(&smgr, &cfg)?;
    ui::display_plan(&changes);
    if changes.is_empty() {
        return Ok(());
    }

    if !args.yes && !confirm_proceed()? {
        println!();
        ui::warn("Aborted");
        return Ok(());
    }

    let errors = execute(&mut smgr, &registry, &cfg, &mut changes);
    finish(&changes, &errors)
}

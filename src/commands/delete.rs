//! `rigger delete` - remove every tool the config declares

use anyhow::Result;
use reconcile::{execute, plan_for_delete, plan_for_force_delete};

use crate::cli::DeleteArgs;
use crate::plugins;
use crate::ui;
use crate::Context;

use super::{confirm_proceed, finish, load_validated_config, open_state};

pub fn run(ctx: &Context, args: DeleteArgs) -> Result<()> {
    let cfg = load_validated_config(ctx)?;
    let mut smgr = open_state(ctx)?;
    let registry = plugins::builtin_registry();

    let mut changes = if args.force {
        plan_for_force_delete(&smgr, &cfg)?
    } else {
        plan_for_delete(&smgr, &cfg)?
    };

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

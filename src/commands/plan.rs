//! `rigger plan` - preview what apply would change

use anyhow::Result;
use reconcile::plan_for_apply;

use crate::ui;
use crate::Context;

use super::{load_validated_config, open_state};

pub fn run(ctx: &Context) -> Result<()> {
    let cfg = load_validated_config(ctx)?;
    let smgr = open_state(ctx)?;

    let changes = plan_for_apply(&smgr, &cfg)?;
    ui::display_plan(&changes);
    Ok(())
}

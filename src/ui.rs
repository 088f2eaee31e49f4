use colored::Colorize;
use reconcile::{Action, Change, EngineError};
use std::collections::BTreeMap;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Display a plan in a user-friendly format
pub fn display_plan(changes: &[Change]) {
    if changes.is_empty() {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!("{}", "Plan".bold());
    for change in changes {
        let symbol = match change.action {
            Action::Create => "+".green(),
            Action::Update => "~".yellow(),
            Action::Delete => "-".red(),
        };
        println!(
            "  {} {:<24} {}",
            symbol,
            change.tool.dependency_ref(),
            change.description.dimmed()
        );
    }

    let creates = changes.iter().filter(|c| c.action == Action::Create).count();
    let updates = changes.iter().filter(|c| c.action == Action::Update).count();
    let deletes = changes.iter().filter(|c| c.action == Action::Delete).count();
    println!();
    println!(
        "  {} changes: {} to create, {} to update, {} to delete",
        changes.len().to_string().bold(),
        creates.to_string().green(),
        updates.to_string().yellow(),
        deletes.to_string().red()
    );
}

/// Display per-change outcomes and the failure map after execution
pub fn display_outcome(changes: &[Change], errors: &BTreeMap<String, EngineError>) {
    println!();
    for change in changes {
        let succeeded = change
            .result
            .as_ref()
            .map(|r| r.succeeded)
            .unwrap_or(false);
        if succeeded {
            println!(
                "  {} {} {}",
                "✓".green(),
                change.tool.dependency_ref(),
                change.action.to_string().to_lowercase().dimmed()
            );
        } else {
            let reason = change
                .result
                .as_ref()
                .and_then(|r| r.error.clone())
                .unwrap_or_else(|| "unknown failure".to_string());
            println!(
                "  {} {} {}: {}",
                "✗".red(),
                change.tool.dependency_ref(),
                change.action.to_string().to_lowercase(),
                reason.red()
            );
        }
    }

    println!();
    if errors.is_empty() {
        println!("  {} All changes applied", "✓".green().bold());
    } else {
        println!(
            "  {} {} of {} changes failed",
            "⚠".yellow().bold(),
            errors.len(),
            changes.len()
        );
    }
}

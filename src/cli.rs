use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rigger")]
#[command(version)]
#[command(about = "Declarative orchestrator for infrastructure tools", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the tools config (TOML or JSON)
    #[arg(short = 'f', long, global = true, default_value = "rigger.toml")]
    pub config: PathBuf,

    /// Path to the state file
    #[arg(long, global = true, default_value = "rigger.state.json")]
    pub state: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create, update, or remove tools so the world matches the config
    Apply(ApplyArgs),

    /// Remove every tool declared in the config
    Delete(DeleteArgs),

    /// Preview the changes apply would make
    Plan,

    /// Check the config for structural and dependency problems
    Validate,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser)]
pub struct DeleteArgs {
    /// Also attempt deletion of tools that have no recorded state
    #[arg(long)]
    pub force: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

//! Config file loading for the CLI
//!
//! The engine consumes an already-parsed [`Config`]; this module owns the
//! file format. TOML is preferred, JSON is accepted.

use anyhow::{Context, Result};
use reconcile::Config;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn parse(&self, content: &str) -> Result<Config> {
        match self {
            ConfigFormat::Json => serde_json::from_str(content).context("Invalid JSON config"),
            ConfigFormat::Toml => toml::from_str(content).context("Invalid TOML config"),
        }
    }
}

fn format_for(path: &Path) -> ConfigFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => ConfigFormat::Json,
        _ => ConfigFormat::Toml,
    }
}

/// Resolve the config path, falling back from `<stem>.toml` to
/// `<stem>.json` when the default TOML file is absent.
fn resolve_path(path: &Path) -> PathBuf {
    if path.exists() {
        return path.to_path_buf();
    }
    let json_sibling = path.with_extension("json");
    if json_sibling.exists() {
        return json_sibling;
    }
    path.to_path_buf()
}

/// Load and parse the tools config
pub fn load(path: &Path) -> Result<Config> {
    let path = resolve_path(path);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Could not read config file: {}", path.display()))?;
    format_for(&path).parse(&content)
}

//! Plugin that shells out for each action
//!
//! Options:
//! - `create`: command string, required
//! - `update`: command string, defaults to the create command
//! - `delete`: command string; with none configured, delete is a no-op
//!
//! Stdout that parses as a JSON object becomes the tool's outputs;
//! anything else is wrapped as `{ "stdout": <trimmed text> }`.

use anyhow::{bail, Context, Result};
use reconcile::{Outputs, Plugin, Tool};
use serde_json::Value;
use std::process::{Command, Output};

pub struct ShellPlugin;

impl ShellPlugin {
    fn command_for<'a>(tool: &'a Tool, action: &str) -> Option<&'a str> {
        tool.options.get(action).and_then(Value::as_str)
    }

    fn run(command: &str) -> Result<Output> {
        Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .with_context(|| format!("failed to run: {}", command))
    }

    fn run_for_outputs(command: &str) -> Result<Outputs> {
        let output = Self::run(command)?;
        if !output.status.success() {
            bail!(
                "command failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(Self::outputs_from(&output.stdout))
    }

    fn outputs_from(stdout: &[u8]) -> Outputs {
        let text = String::from_utf8_lossy(stdout);
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&text) {
            return map;
        }
        let mut outputs = Outputs::new();
        outputs.insert(
            "stdout".to_string(),
            Value::String(text.trim().to_string()),
        );
        outputs
    }
}

impl Plugin for ShellPlugin {
    fn create(&self, tool: &Tool) -> Result<Outputs> {
        let command = Self::command_for(tool, "create")
            .with_context(|| format!("tool {}: options.create must be a string", tool.instance_id))?;
        Self::run_for_outputs(command)
    }

    fn update(&self, tool: &Tool) -> Result<Outputs> {
        let command = Self::command_for(tool, "update")
            .or_else(|| Self::command_for(tool, "create"))
            .with_context(|| format!("tool {}: options.update must be a string", tool.instance_id))?;
        Self::run_for_outputs(command)
    }

    fn delete(&self, tool: &Tool) -> Result<bool> {
        let Some(command) = Self::command_for(tool, "delete") else {
            // Nothing to clean up
            return Ok(true);
        };
        Ok(Self::run(command)?.status.success())
    }

    fn validate_options(&self, options: &Value) -> Result<()> {
        if options.get("create").and_then(Value::as_str).is_none() {
            bail!("options.create is required and must be a command string");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::PluginRef;
    use serde_json::json;

    fn tool(options: Value) -> Tool {
        Tool {
            name: "shell".to_string(),
            instance_id: "t".to_string(),
            depends_on: Vec::new(),
            plugin: PluginRef {
                kind: "shell".to_string(),
                version: "0.1.0".to_string(),
            },
            options,
        }
    }

    #[test]
    fn test_create_captures_stdout() {
        let outputs = ShellPlugin
            .create(&tool(json!({"create": "echo hello"})))
            .unwrap();
        assert_eq!(outputs["stdout"], "hello");
    }

    #[test]
    fn test_create_json_stdout_becomes_outputs() {
        let outputs = ShellPlugin
            .create(&tool(json!({"create": r#"echo '{"url": "https://x"}'"#})))
            .unwrap();
        assert_eq!(outputs["url"], "https://x");
    }

    #[test]
    fn test_create_failure() {
        assert!(ShellPlugin.create(&tool(json!({"create": "false"}))).is_err());
    }

    #[test]
    fn test_update_falls_back_to_create_command() {
        let outputs = ShellPlugin
            .update(&tool(json!({"create": "echo again"})))
            .unwrap();
        assert_eq!(outputs["stdout"], "again");
    }

    #[test]
    fn test_delete_without_command_is_noop() {
        assert!(ShellPlugin.delete(&tool(json!({}))).unwrap());
    }

    #[test]
    fn test_delete_reports_exit_status() {
        assert!(ShellPlugin.delete(&tool(json!({"delete": "true"}))).unwrap());
        assert!(!ShellPlugin.delete(&tool(json!({"delete": "false"}))).unwrap());
    }

    #[test]
    fn test_validate_options() {
        assert!(ShellPlugin.validate_options(&json!({"create": "echo"})).is_ok());
        assert!(ShellPlugin.validate_options(&json!({})).is_err());
        assert!(ShellPlugin.validate_options(&json!({"create": 3})).is_err());
    }
}

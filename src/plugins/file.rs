//! Plugin that manages a plain file on disk
//!
//! Options: `path` (required), `content` (defaults to empty). Outputs:
//! `{ "path": <absolute path> }`.

use anyhow::{Context, Result};
use reconcile::{Outputs, Plugin, Tool};
use serde_json::Value;
use std::fs;
use std::path::absolute;

pub struct FilePlugin;

impl FilePlugin {
    fn path_for(tool: &Tool) -> Result<&str> {
        tool.options
            .get("path")
            .and_then(Value::as_str)
            .with_context(|| format!("tool {}: options.path must be a string", tool.instance_id))
    }

    fn write(tool: &Tool) -> Result<Outputs> {
        // A relative options.path resolves against the working directory;
        // outputs always carry the absolute form.
        let path = absolute(Self::path_for(tool)?)
            .with_context(|| format!("tool {}: invalid options.path", tool.instance_id))?;
        let content = tool
            .options
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default();

        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory: {}", dir.display()))?;
        }
        fs::write(&path, content)
            .with_context(|| format!("failed to write: {}", path.display()))?;

        let mut outputs = Outputs::new();
        outputs.insert(
            "path".to_string(),
            Value::String(path.display().to_string()),
        );
        Ok(outputs)
    }
}

impl Plugin for FilePlugin {
    fn create(&self, tool: &Tool) -> Result<Outputs> {
        Self::write(tool)
    }

    fn update(&self, tool: &Tool) -> Result<Outputs> {
        Self::write(tool)
    }

    fn delete(&self, tool: &Tool) -> Result<bool> {
        let path = Self::path_for(tool)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            // Already absent counts as deleted
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(err) => Err(err).with_context(|| format!("failed to remove: {}", path)),
        }
    }

    fn validate_options(&self, options: &Value) -> Result<()> {
        if options.get("path").and_then(Value::as_str).is_none() {
            anyhow::bail!("options.path is required and must be a string");
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
            name: "file".to_string(),
            instance_id: "t".to_string(),
            depends_on: Vec::new(),
            plugin: PluginRef {
                kind: "file".to_string(),
                version: "0.1.0".to_string(),
            },
            options,
        }
    }

    #[test]
    fn test_create_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.txt");
        let t = tool(json!({"path": path.to_str().unwrap(), "content": "hello"}));

        let outputs = FilePlugin.create(&t).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
        assert_eq!(outputs["path"], *path.to_str().unwrap());
    }

    #[test]
    fn test_update_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "old").unwrap();

        let t = tool(json!({"path": path.to_str().unwrap(), "content": "new"}));
        FilePlugin.update(&t).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "x").unwrap();

        let t = tool(json!({"path": path.to_str().unwrap()}));
        assert!(FilePlugin.delete(&t).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_delete_absent_file_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.txt");
        let t = tool(json!({"path": path.to_str().unwrap()}));
        assert!(FilePlugin.delete(&t).unwrap());
    }

    #[test]
    fn test_relative_path_reported_absolute() {
        let t = tool(json!({"path": "rigger-plugin-test.txt", "content": "x"}));

        let outputs = FilePlugin.create(&t).unwrap();
        let reported = outputs["path"].as_str().unwrap();
        assert!(std::path::Path::new(reported).is_absolute());
        assert!(reported.ends_with("rigger-plugin-test.txt"));

        fs::remove_file(reported).unwrap();
    }

    #[test]
    fn test_validate_options() {
        assert!(FilePlugin.validate_options(&json!({"path": "/tmp/x"})).is_ok());
        assert!(FilePlugin.validate_options(&json!({})).is_err());
    }
}

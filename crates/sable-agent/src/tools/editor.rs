//! File viewing and editing tool

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::environment::Environment;
use crate::tool::{Tool, ToolError};

/// Tool for reading, creating, and editing files through the environment
pub struct EditorTool {
    environment: Arc<dyn Environment>,
}

impl EditorTool {
    pub fn new(environment: Arc<dyn Environment>) -> Self {
        Self { environment }
    }

    async fn view(&self, path: &str) -> String {
        match self.environment.read_file(path).await {
            Ok(content) => {
                let numbered: Vec<String> = content
                    .split('\n')
                    .enumerate()
                    .map(|(i, line)| format!("{}: {}", i + 1, line))
                    .collect();
                format!("File: {}\n{}", path, numbered.join("\n"))
            }
            Err(e) => format!("Error reading file: {}", e),
        }
    }

    async fn create(&self, path: &str, content: &str) -> String {
        match self.environment.write_file(path, content).await {
            Ok(()) => format!("File created: {}", path),
            Err(e) => format!("Error creating file: {}", e),
        }
    }

    async fn str_replace(&self, path: &str, old_str: &str, new_str: &str) -> String {
        let content = match self.environment.read_file(path).await {
            Ok(c) => c,
            Err(e) => return format!("Error editing file: {}", e),
        };

        if !content.contains(old_str) {
            return format!("Error: old_str not found in {}", path);
        }

        // Counts every literal occurrence but replaces only the first, so
        // the reported count can overstate what was changed. Downstream
        // consumers match on this message; see the str_replace tests before
        // changing it.
        let occurrences = content.matches(old_str).count();
        let new_content = content.replacen(old_str, new_str, 1);

        match self.environment.write_file(path, &new_content).await {
            Ok(()) => format!("Replaced {} occurrence(s) in {}", occurrences, path),
            Err(e) => format!("Error editing file: {}", e),
        }
    }
}

#[async_trait]
impl Tool for EditorTool {
    fn name(&self) -> &str {
        "editor"
    }

    fn description(&self) -> &str {
        "Read, write, and edit files"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "enum": ["view", "create", "str_replace"],
                    "description": "The editor command to execute"
                },
                "path": {
                    "type": "string",
                    "description": "The file path"
                },
                "content": {
                    "type": "string",
                    "description": "Content for create command"
                },
                "old_str": {
                    "type": "string",
                    "description": "String to replace (for str_replace)"
                },
                "new_str": {
                    "type": "string",
                    "description": "Replacement string (for str_replace)"
                }
            },
            "required": ["command", "path"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let command = arguments
            .get("command")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::new("Missing 'command' argument"))?;
        let path = arguments
            .get("path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::new("Missing 'path' argument"))?;

        let arg = |key: &str| {
            arguments
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
        };

        match command {
            "view" => Ok(self.view(path).await),
            "create" => {
                let content = arg("content")
                    .ok_or_else(|| ToolError::new("Content is required for create command"))?;
                Ok(self.create(path, content).await)
            }
            "str_replace" => {
                let (Some(old_str), Some(new_str)) = (arg("old_str"), arg("new_str")) else {
                    return Err(ToolError::new(
                        "old_str and new_str are required for str_replace command",
                    ));
                };
                Ok(self.str_replace(path, old_str, new_str).await)
            }
            other => Ok(format!("Unknown command: {}", other)),
        }
    }
}

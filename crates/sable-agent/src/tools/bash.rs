//! Bash command execution tool

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::environment::Environment;
use crate::tool::{Tool, ToolError};

/// Literal result returned when a command produces no output and exits zero
const NO_OUTPUT: &str = "Command executed successfully with no output";

/// Tool for executing bash commands in the environment
pub struct BashTool {
    environment: Arc<dyn Environment>,
}

impl BashTool {
    pub fn new(environment: Arc<dyn Environment>) -> Self {
        Self { environment }
    }
}

#[async_trait]
impl Tool for BashTool {
    fn name(&self) -> &str {
        "bash"
    }

    fn description(&self) -> &str {
        "Execute a bash command in the environment"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The bash command to execute"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let command = arguments
            .get("command")
            .and_then(|v| v.as_str())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ToolError::new("Command is required"))?;

        let result = self.environment.execute(command).await;

        let mut output = String::new();
        if !result.stdout.is_empty() {
            output.push_str(&result.stdout);
        }
        if !result.stderr.is_empty() {
            output.push_str(&format!("\nSTDERR:\n{}", result.stderr));
        }
        if result.exit_code != 0 {
            output.push_str(&format!("\nExit code: {}", result.exit_code));
        }

        if output.is_empty() {
            Ok(NO_OUTPUT.to_string())
        } else {
            Ok(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::LocalEnvironment;
    use tempfile::TempDir;

    fn bash() -> (TempDir, BashTool) {
        let dir = TempDir::new().unwrap();
        let env: Arc<dyn Environment> = Arc::new(LocalEnvironment::new(dir.path()));
        (dir, BashTool::new(env))
    }

    #[tokio::test]
    async fn test_no_output_sentinel() {
        let (_dir, tool) = bash();
        let result = tool.execute(json!({"command": "true"})).await.unwrap();
        assert_eq!(result, NO_OUTPUT);
    }

    #[tokio::test]
    async fn test_stdout_only() {
        let (_dir, tool) = bash();
        let result = tool.execute(json!({"command": "echo hi"})).await.unwrap();
        assert_eq!(result, "hi\n");
    }

    #[tokio::test]
    async fn test_stderr_and_exit_code() {
        let (_dir, tool) = bash();
        let result = tool
            .execute(json!({"command": "echo oops >&2; exit 2"}))
            .await
            .unwrap();
        assert!(result.contains("STDERR:\noops"));
        assert!(result.ends_with("Exit code: 2"));
    }

    #[tokio::test]
    async fn test_missing_command_errors() {
        let (_dir, tool) = bash();
        assert!(tool.execute(json!({})).await.is_err());
        assert!(tool.execute(json!({"command": ""})).await.is_err());
    }
}

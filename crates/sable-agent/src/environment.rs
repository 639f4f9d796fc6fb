//! Execution environment abstraction
//!
//! Tools run against an `Environment` rather than the host directly, so a
//! sandboxed or remote variant can be injected without touching the engine.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;

/// Outcome of a command execution. Failures surface via a non-zero exit code
/// and populated stderr; `execute` itself never fails.
#[derive(Debug, Clone)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Capability providing command execution and file I/O for tools
#[async_trait]
pub trait Environment: Send + Sync {
    /// Run a shell command to completion
    async fn execute(&self, command: &str) -> ExecResult;

    /// Read a file as UTF-8 text
    async fn read_file(&self, path: &str) -> io::Result<String>;

    /// Write a file, creating parent directories as needed
    async fn write_file(&self, path: &str, content: &str) -> io::Result<()>;

    /// List the plain files (not subdirectories) in a directory
    async fn list_files(&self, path: &str) -> io::Result<Vec<String>>;
}

/// Environment backed by the local filesystem and shell, scoped to a
/// working directory. Relative paths resolve against the working directory.
pub struct LocalEnvironment {
    working_dir: PathBuf,
}

impl LocalEnvironment {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn resolve(&self, path: &str) -> PathBuf {
        // join() keeps absolute paths as-is
        self.working_dir.join(path)
    }
}

#[async_trait]
impl Environment for LocalEnvironment {
    async fn execute(&self, command: &str) -> ExecResult {
        let (shell, shell_arg) = if cfg!(target_os = "windows") {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };

        let output = Command::new(shell)
            .arg(shell_arg)
            .arg(command)
            .current_dir(&self.working_dir)
            .output()
            .await;

        match output {
            Ok(output) => ExecResult {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code().unwrap_or(-1),
            },
            // Spawn failures are reported like a failed command
            Err(e) => ExecResult {
                stdout: String::new(),
                stderr: e.to_string(),
                exit_code: 1,
            },
        }
    }

    async fn read_file(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(self.resolve(path)).await
    }

    async fn write_file(&self, path: &str, content: &str) -> io::Result<()> {
        let full_path = self.resolve(path);
        if let Some(parent) = full_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(full_path, content).await
    }

    async fn list_files(&self, path: &str) -> io::Result<Vec<String>> {
        let mut entries = fs::read_dir(self.resolve(path)).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn local() -> (TempDir, LocalEnvironment) {
        let dir = TempDir::new().unwrap();
        let env = LocalEnvironment::new(dir.path());
        (dir, env)
    }

    #[tokio::test]
    async fn test_execute_captures_stdout() {
        let (_dir, env) = local();
        let result = env.execute("echo hello").await;
        assert_eq!(result.stdout.trim(), "hello");
        assert_eq!(result.exit_code, 0);
        assert!(result.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_execute_nonzero_exit() {
        let (_dir, env) = local();
        let result = env.execute("exit 3").await;
        assert_eq!(result.exit_code, 3);
    }

    #[tokio::test]
    async fn test_execute_runs_in_working_dir() {
        let (dir, env) = local();
        env.write_file("marker.txt", "x").await.unwrap();
        let result = env.execute("ls").await;
        assert!(result.stdout.contains("marker.txt"));
        drop(dir);
    }

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let (_dir, env) = local();
        env.write_file("a/b/c.txt", "nested").await.unwrap();
        assert_eq!(env.read_file("a/b/c.txt").await.unwrap(), "nested");
    }

    #[tokio::test]
    async fn test_read_missing_file_errors() {
        let (_dir, env) = local();
        assert!(env.read_file("nope.txt").await.is_err());
    }

    #[tokio::test]
    async fn test_list_files_excludes_directories() {
        let (_dir, env) = local();
        env.write_file("top.txt", "1").await.unwrap();
        env.write_file("sub/inner.txt", "2").await.unwrap();

        let files = env.list_files(".").await.unwrap();
        assert!(files.contains(&"top.txt".to_string()));
        assert!(!files.iter().any(|f| f == "sub"));
    }
}

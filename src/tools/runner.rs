//! 代码执行器：将生成的代码写入临时文件，用解释器在独立进程中运行
//!
//! 带墙钟超时；超时或退出时子进程被杀掉（kill_on_drop），临时文件随 NamedTempFile 释放而删除。

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

/// 进程未能正常跑完（超时 / 无法启动 / 临时文件读写失败）
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Code execution timed out after {0}s")]
    Timeout(u64),

    #[error("Failed to start interpreter: {0}")]
    Spawn(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 一次执行的结果（进程已退出）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// 被信号终止时为 None
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// 代码执行抽象：测试中可替换为脚本化实现
#[async_trait]
pub trait CodeRunner: Send + Sync {
    async fn run(&self, code: &str) -> Result<ExecutionOutcome, ExecError>;
}

/// 默认实现：临时文件 + 解释器子进程
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    interpreter: String,
    file_suffix: String,
    timeout_secs: u64,
}

impl ProcessRunner {
    pub fn new(interpreter: impl Into<String>, file_suffix: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            interpreter: interpreter.into(),
            file_suffix: file_suffix.into(),
            timeout_secs,
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new("python3", ".py", 30)
    }
}

#[async_trait]
impl CodeRunner for ProcessRunner {
    async fn run(&self, code: &str) -> Result<ExecutionOutcome, ExecError> {
        let mut file = tempfile::Builder::new()
            .prefix("bee_solver_")
            .suffix(&self.file_suffix)
            .tempfile()?;
        file.write_all(code.as_bytes())?;
        file.flush()?;

        tracing::info!(
            interpreter = %self.interpreter,
            path = %file.path().display(),
            bytes = code.len(),
            "code execute"
        );

        let child = Command::new(&self.interpreter)
            .arg(file.path())
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecError::Spawn(format!("{}: {}", self.interpreter, e)))?;

        let output = tokio::time::timeout(
            Duration::from_secs(self.timeout_secs),
            child.wait_with_output(),
        )
        .await
        .map_err(|_| ExecError::Timeout(self.timeout_secs))??;

        // file 在此处离开作用域被删除
        Ok(ExecutionOutcome {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_run_captures_stdout() {
        let runner = ProcessRunner::new("sh", ".sh", 10);
        let out = runner.run("echo optimal=42").await.unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "optimal=42");
    }

    #[tokio::test]
    async fn test_non_zero_exit_captures_stderr() {
        let runner = ProcessRunner::new("sh", ".sh", 10);
        let out = runner.run("echo boom >&2; exit 3").await.unwrap();
        assert!(!out.success());
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stderr.trim(), "boom");
    }

    #[tokio::test]
    async fn test_timeout() {
        let runner = ProcessRunner::new("sh", ".sh", 1);
        let err = runner.run("sleep 5").await.unwrap_err();
        assert!(matches!(err, ExecError::Timeout(1)));
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        let runner = ProcessRunner::new("definitely-not-an-interpreter-xyz", ".py", 5);
        let err = runner.run("print(1)").await.unwrap_err();
        assert!(matches!(err, ExecError::Spawn(_)));
    }
}

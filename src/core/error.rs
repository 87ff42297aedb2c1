//! Agent 错误类型
//!
//! 编排器内部使用；所有错误最终都被转为 ConversationState.result 中的描述文本，不会逃出编排器。

use thiserror::Error;

use crate::tools::ExecError;

/// Agent 运行过程中可能出现的错误（模型调用、解析、代码执行、配置加载等）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Network timeout")]
    NetworkTimeout,

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    /// 进程正常退出但返回码非 0：进入反思修复
    #[error("Code exited with {exit_code:?}: {stderr}")]
    CodeExecutionFailed { exit_code: Option<i32>, stderr: String },

    /// 超时 / 无法启动解释器
    #[error(transparent)]
    Execution(#[from] ExecError),

    #[error("Code execution failed after {attempts} attempts:\n{last_error}")]
    ReflectionExhausted { attempts: u32, last_error: String },

    #[error("Config error: {0}")]
    ConfigError(String),
}

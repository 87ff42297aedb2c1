//! 会话状态：一次运行的输入、过程与结果
//!
//! 每次运行新建一个 ConversationState，只由编排器各阶段修改，运行结束后交还调用方。

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::memory::Message;

/// 运行模式；无法识别的模式字符串归为 Unknown
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    Tutor,
    Solver,
    #[serde(other)]
    Unknown,
}

impl FromStr for AgentMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "tutor" => Self::Tutor,
            "solver" => Self::Solver,
            _ => Self::Unknown,
        })
    }
}

/// 一次运行的完整状态
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationState {
    pub mode: AgentMode,
    pub question: String,
    #[serde(default)]
    pub materials: Vec<PathBuf>,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub solution_steps: Vec<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub reflection_count: u32,
}

impl ConversationState {
    pub fn new(mode: AgentMode, question: impl Into<String>) -> Self {
        Self {
            mode,
            question: question.into(),
            materials: Vec::new(),
            context: String::new(),
            solution_steps: Vec::new(),
            code: String::new(),
            result: None,
            messages: Vec::new(),
            reflection_count: 0,
        }
    }

    /// 辅导模式：基于给定材料回答问题
    pub fn tutor(question: impl Into<String>, materials: Vec<PathBuf>) -> Self {
        Self {
            materials,
            ..Self::new(AgentMode::Tutor, question)
        }
    }

    /// 求解模式：question 为优化问题描述
    pub fn solver(problem: impl Into<String>) -> Self {
        Self::new(AgentMode::Solver, problem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Tutor".parse::<AgentMode>().unwrap(), AgentMode::Tutor);
        assert_eq!(" solver ".parse::<AgentMode>().unwrap(), AgentMode::Solver);
        assert_eq!("chat".parse::<AgentMode>().unwrap(), AgentMode::Unknown);

        let m: AgentMode = serde_json::from_str("\"grader\"").unwrap();
        assert_eq!(m, AgentMode::Unknown);
    }

    #[test]
    fn test_state_deserializes_with_defaults() {
        let s: ConversationState =
            serde_json::from_str(r#"{"mode": "solver", "question": "max x"}"#).unwrap();
        assert_eq!(s.mode, AgentMode::Solver);
        assert_eq!(s.reflection_count, 0);
        assert!(s.result.is_none());
    }
}

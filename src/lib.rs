//! Bee Tutor - 基于学习材料的辅导与优化问题求解智能体
//!
//! 模块划分：
//! - **agent**: 无头运行入口（run_tutor / run_solver）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 状态机编排器、会话状态、错误类型、构建器
//! - **llm**: LLM / 嵌入客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **materials**: 文档分块、关键词与向量索引、材料库
//! - **memory**: 对话消息
//! - **react**: Planner、提示词、tutor 循环与 solver 流程
//! - **tools**: 材料工具分发与代码执行

pub mod agent;
pub mod config;
pub mod core;
pub mod llm;
pub mod materials;
pub mod memory;
pub mod observability;
pub mod react;
pub mod tools;

pub use agent::{run_solver, run_tutor, SolverOutcome};
pub use core::{AgentBuilder, AgentMode, ConversationState, Orchestrator};

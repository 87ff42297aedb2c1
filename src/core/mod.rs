//! 核心编排层：错误类型、会话状态、状态机编排器与构建器

pub mod builder;
pub mod error;
pub mod orchestrator;
pub mod state;

pub use builder::{create_agent_builder, AgentBuilder};
pub use error::AgentError;
pub use orchestrator::{Orchestrator, Phase};
pub use state::{AgentMode, ConversationState};

//! 记忆层：单次编排运行内的对话消息

pub mod conversation;

pub use conversation::{Message, Role};

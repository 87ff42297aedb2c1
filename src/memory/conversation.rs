//! 对话消息
//!
//! 一次编排运行内的消息历史（system / user / assistant），同时承载工具调用与函数响应的文本形式。

use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致；Assistant 即模型回合）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 单条消息
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// 工具结果以 user 角色的「函数响应」回注：{"function_response": {"name", "result"}}
    pub fn function_response(name: &str, result: &str) -> Self {
        let body = serde_json::json!({
            "function_response": {
                "name": name,
                "result": result,
            }
        });
        Self::user(body.to_string())
    }
}

//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / DeepSeek / Mock）实现 LlmClient：complete 接收消息历史与本次调用的模型/温度选项。
//! 工具调用不走厂商专有协议，由模型按 system 中注入的声明输出 `{"tool": ..., "args": {...}}` 文本。

use async_trait::async_trait;

use crate::memory::Message;

/// 单次调用的生成选项；model 为 None 时使用客户端默认模型
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

impl CompletionOptions {
    pub fn new(model: Option<String>, temperature: f32) -> Self {
        Self {
            model,
            temperature: Some(temperature),
        }
    }
}

/// LLM 客户端 trait：非流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成，返回模型文本（可能是最终回答，也可能是 JSON 工具调用）
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, String>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}

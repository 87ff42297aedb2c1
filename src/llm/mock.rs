//! Mock LLM / 嵌入客户端（用于测试与离线运行，无需 API）
//!
//! MockLlmClient 按脚本依次返回预设回复，脚本用尽后重复最后一条；未设脚本时回显最后一条 User 消息。
//! MockEmbedder 以词袋哈希生成确定性向量，便于本地跑通语义检索。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{CompletionOptions, EmbeddingProvider, LlmClient};
use crate::memory::{Message, Role};

/// Mock 客户端：脚本化回复，并记录每次调用收到的消息
#[derive(Debug, Default)]
pub struct MockLlmClient {
    script: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 依次返回 replies 中的内容，用尽后重复最后一条
    pub fn with_script<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// 已发生的调用次数
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// 第 n 次调用收到的消息（用于断言 prompt 内容）
    pub fn call_messages(&self, n: usize) -> Option<Vec<Message>> {
        self.calls.lock().ok().and_then(|c| c.get(n).cloned())
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(
        &self,
        messages: &[Message],
        _options: &CompletionOptions,
    ) -> Result<String, String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }

        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        let mut last = self.last.lock().map_err(|e| e.to_string())?;
        if let Some(reply) = next {
            *last = Some(reply.clone());
            return Ok(reply);
        }
        if let Some(reply) = last.as_ref() {
            return Ok(reply.clone());
        }

        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");
        Ok(format!("Echo from Mock: {}", last_user))
    }
}

/// 确定性嵌入：按小写词哈希到固定维度并归一化
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dims: usize,
}

impl MockEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, _model: &str, text: &str) -> Result<Vec<f32>, String> {
        let mut v = vec![0f32; self.dims];
        for token in crate::materials::tokenizer::tokenize(text) {
            // FNV-1a
            let mut h: u64 = 0xcbf29ce484222325;
            for b in token.as_bytes() {
                h ^= u64::from(*b);
                h = h.wrapping_mul(0x100000001b3);
            }
            v[(h % self.dims as u64) as usize] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_repeats_last_reply() {
        let llm = MockLlmClient::with_script(["a", "b"]);
        let opts = CompletionOptions::default();
        assert_eq!(llm.complete(&[], &opts).await.unwrap(), "a");
        assert_eq!(llm.complete(&[], &opts).await.unwrap(), "b");
        assert_eq!(llm.complete(&[], &opts).await.unwrap(), "b");
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn test_echo_without_script() {
        let llm = MockLlmClient::new();
        let out = llm
            .complete(&[Message::user("hi")], &CompletionOptions::default())
            .await
            .unwrap();
        assert_eq!(out, "Echo from Mock: hi");
    }

    #[tokio::test]
    async fn test_mock_embedder_is_deterministic() {
        let e = MockEmbedder::default();
        let a = e.embed("m", "linear programming").await.unwrap();
        let b = e.embed("m", "Linear Programming").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}

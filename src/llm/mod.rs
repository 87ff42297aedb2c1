//! LLM 层：客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）与嵌入提供方

pub mod deepseek;
pub mod embedding;
pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

pub use deepseek::{create_deepseek_client, DEEPSEEK_BASE_URL, DEEPSEEK_CHAT, DEEPSEEK_REASONER};
pub use embedding::{create_embedder_from_config, EmbeddingProvider, OpenAiEmbedder};
pub use mock::{MockEmbedder, MockLlmClient};
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::{CompletionOptions, LlmClient};

use crate::config::AppConfig;

fn has_env(key: &str) -> bool {
    std::env::var(key).map(|v| !v.trim().is_empty()).unwrap_or(false)
}

/// 根据配置与环境变量选择 LLM 后端（DeepSeek / OpenAI 兼容 / Mock）
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    if provider == "mock" {
        tracing::info!("Using Mock LLM (configured)");
        return Arc::new(MockLlmClient::new());
    }

    // 有 DeepSeek Key 或（配置为 deepseek 且仅有 OpenAI Key 时也走 DeepSeek 兼容端点）
    let use_deepseek = (provider == "deepseek" && (has_env("DEEPSEEK_API_KEY") || has_env("OPENAI_API_KEY")))
        || (provider != "openai" && has_env("DEEPSEEK_API_KEY"));
    let use_openai = has_env("OPENAI_API_KEY") && provider == "openai";

    if use_deepseek {
        tracing::info!("Using DeepSeek LLM ({})", cfg.llm.model);
        Arc::new(create_deepseek_client(Some(&cfg.llm.model)))
    } else if use_openai {
        let base = cfg.llm.base_url.as_deref();
        tracing::info!("Using OpenAI LLM ({})", cfg.llm.model);
        Arc::new(OpenAiClient::new(
            base,
            &cfg.llm.model,
            std::env::var("OPENAI_API_KEY").ok().as_deref(),
        ))
    } else {
        tracing::warn!("No API key set or provider unknown, using Mock LLM");
        Arc::new(MockLlmClient::new())
    }
}

/// 嵌入提供方：mock 后端用确定性的 MockEmbedder，否则需要 OPENAI_API_KEY
pub fn create_embedder(cfg: &AppConfig) -> Option<Arc<dyn EmbeddingProvider>> {
    if cfg.llm.provider.eq_ignore_ascii_case("mock") {
        return Some(Arc::new(MockEmbedder::default()));
    }
    let base = cfg
        .materials
        .embedding_base_url
        .as_deref()
        .or(cfg.llm.base_url.as_deref());
    let embedder = create_embedder_from_config(base, None);
    if embedder.is_none() {
        tracing::warn!("No embedding provider available, semantic_search will return no results");
    }
    embedder
}

//! Agent 构建器：从配置组装编排器
//!
//! 模型、嵌入提供方、材料库、代码执行器都可以在 build 前替换（测试中注入 Mock）。

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::core::{AgentError, Orchestrator};
use crate::llm::{create_embedder, create_llm_from_config, EmbeddingProvider, LlmClient};
use crate::materials::{ChunkingConfig, MaterialStore};
use crate::react::Planner;
use crate::tools::{CodeRunner, ProcessRunner};

/// Agent 构建器
pub struct AgentBuilder {
    config: AppConfig,
    llm: Option<Arc<dyn LlmClient>>,
    embedder: Option<Option<Arc<dyn EmbeddingProvider>>>,
    store: Option<Arc<Mutex<MaterialStore>>>,
    runner: Option<Arc<dyn CodeRunner>>,
}

impl AgentBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            llm: None,
            embedder: None,
            store: None,
            runner: None,
        }
    }

    /// 指定 LLM 客户端（默认按配置与环境变量选择）
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// 指定嵌入提供方；None 表示不做语义检索
    pub fn with_embedder(mut self, embedder: Option<Arc<dyn EmbeddingProvider>>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// 共享已有的材料库（多个编排器共用缓存）
    pub fn with_store(mut self, store: Arc<Mutex<MaterialStore>>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn CodeRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 构建 LLM 客户端
    pub fn build_llm(&self) -> Arc<dyn LlmClient> {
        self.llm
            .clone()
            .unwrap_or_else(|| create_llm_from_config(&self.config))
    }

    /// 构建材料库
    pub fn build_store(&self) -> Arc<Mutex<MaterialStore>> {
        if let Some(store) = &self.store {
            return store.clone();
        }
        let embedder = match &self.embedder {
            Some(e) => e.clone(),
            None => create_embedder(&self.config),
        };
        let m = &self.config.materials;
        let chunking = ChunkingConfig {
            chunk_size: m.chunk_size,
            chunk_overlap: m.chunk_overlap,
        };
        Arc::new(Mutex::new(MaterialStore::new(
            chunking,
            m.embedding_model.clone(),
            embedder,
        )))
    }

    /// 构建代码执行器
    pub fn build_runner(&self) -> Arc<dyn CodeRunner> {
        if let Some(runner) = &self.runner {
            return runner.clone();
        }
        let s = &self.config.solver;
        Arc::new(ProcessRunner::new(
            s.interpreter.clone(),
            s.file_suffix.clone(),
            s.exec_timeout_secs,
        ))
    }

    /// 组装编排器
    pub fn build(self) -> Orchestrator {
        let planner = Planner::new(self.build_llm(), self.config.llm.timeouts.request);
        let store = self.build_store();
        let runner = self.build_runner();
        Orchestrator::new(
            planner,
            store,
            runner,
            self.config.agents,
            self.config.tutor,
            self.config.solver,
        )
    }
}

impl AgentBuilder {
    /// 从配置文件创建；配置无法解析时返回 ConfigError
    pub fn from_config_path(config_path: Option<PathBuf>) -> Result<Self, AgentError> {
        let config = crate::config::load_config(config_path)
            .map_err(|e| AgentError::ConfigError(e.to_string()))?;
        Ok(Self::new(config))
    }
}

/// 便捷函数：加载配置（失败时用默认值）并创建 AgentBuilder
pub fn create_agent_builder(config_path: Option<PathBuf>) -> AgentBuilder {
    AgentBuilder::from_config_path(config_path).unwrap_or_else(|e| {
        tracing::warn!("{}, using defaults", e);
        AgentBuilder::new(AppConfig::default())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_config_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[solver\nmax_reflections = ").unwrap();

        let err = AgentBuilder::from_config_path(Some(path.clone())).err().unwrap();
        assert!(matches!(err, AgentError::ConfigError(_)));
        assert!(err.to_string().starts_with("Config error: "));

        let builder = create_agent_builder(Some(path));
        assert_eq!(builder.config().solver.max_reflections, 3);
    }

    #[test]
    fn test_explicit_config_reaches_builder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bee.toml");
        std::fs::write(&path, "[solver]\nmax_reflections = 5\n").unwrap();

        let builder = AgentBuilder::from_config_path(Some(path)).unwrap();
        assert_eq!(builder.config().solver.max_reflections, 5);
    }
}

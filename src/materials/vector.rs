//! 向量索引
//!
//! 每个块通过 EmbeddingProvider 编码后存入内存，检索时按余弦相似度排序。
//! 单块嵌入失败只记录日志并跳过该块；无嵌入提供方或查询嵌入失败时检索返回空。

use std::sync::Arc;

use crate::llm::EmbeddingProvider;
use crate::materials::{Chunk, ChunkHit, MaterialError};

/// 余弦相似度；维度不一致或零向量时为 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// 内存向量索引
pub struct VectorIndex {
    model: String,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    entries: Vec<(Chunk, Vec<f32>)>,
}

impl VectorIndex {
    pub fn new(model: impl Into<String>, embedder: Option<Arc<dyn EmbeddingProvider>>) -> Self {
        Self {
            model: model.into(),
            embedder,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 逐块嵌入并加入索引，返回成功加入的块数
    pub async fn add(&mut self, chunks: &[Chunk]) -> usize {
        let Some(embedder) = self.embedder.clone() else {
            tracing::debug!(chunks = chunks.len(), "no embedding provider, vector index left empty");
            return 0;
        };

        let mut added = 0;
        for chunk in chunks {
            let result = match embedder.embed(&self.model, &chunk.content).await {
                Ok(v) if v.is_empty() => Err("empty embedding".to_string()),
                other => other,
            };
            match result {
                Ok(vector) => {
                    self.entries.push((chunk.clone(), vector));
                    added += 1;
                }
                Err(reason) => {
                    let err = MaterialError::EmbeddingFailure {
                        chunk_id: chunk.chunk_id,
                        reason,
                    };
                    tracing::warn!("{}", err);
                }
            }
        }
        added
    }

    /// 返回与查询最相似的前 top_k 个块（相似度降序，同分保持加入顺序）
    pub async fn search(&self, query: &str, top_k: usize) -> Vec<ChunkHit> {
        if self.entries.is_empty() || top_k == 0 {
            return Vec::new();
        }
        let Some(embedder) = self.embedder.as_ref() else {
            return Vec::new();
        };

        let query_vec = match embedder.embed(&self.model, query).await {
            Ok(v) if !v.is_empty() => v,
            Ok(_) => {
                tracing::warn!("{}", MaterialError::QueryEmbeddingFailure("empty embedding".into()));
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("{}", MaterialError::QueryEmbeddingFailure(e));
                return Vec::new();
            }
        };

        let mut scored: Vec<(f32, &Chunk)> = self
            .entries
            .iter()
            .map(|(chunk, v)| (cosine_similarity(&query_vec, v), chunk))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(top_k)
            .map(|(score, chunk)| ChunkHit::from_chunk(chunk, score))
            .collect()
    }
}

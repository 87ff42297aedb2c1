//! 材料检索的数据类型：页、文本块、检索命中、加载摘要

use std::collections::HashMap;

use serde::Serialize;

/// 预览截断长度（字符）
pub const PREVIEW_CHARS: usize = 200;

/// 文档的一页文本（页码从 1 开始）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub text: String,
}

impl Page {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// 文本块：创建后不可变；chunk_id 在单个文档内从 0 连续递增
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub content: String,
    pub page_num: u32,
    pub chunk_id: usize,
    pub metadata: HashMap<String, String>,
}

impl Chunk {
    /// 本块开头携带的上一块重叠字符数（页内第一块为 0）
    pub fn overlap_chars(&self) -> usize {
        self.metadata
            .get("overlap_chars")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// 前 200 字符，超长时追加 "..."
    pub fn preview(&self) -> String {
        if self.content.chars().count() > PREVIEW_CHARS {
            let head: String = self.content.chars().take(PREVIEW_CHARS).collect();
            format!("{}...", head)
        } else {
            self.content.clone()
        }
    }
}

/// 检索命中：供工具格式化的块视图
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkHit {
    pub chunk_id: usize,
    pub page_num: u32,
    pub content: String,
    pub preview: String,
    /// 关键词分数或余弦相似度
    pub score: f32,
}

impl ChunkHit {
    pub fn from_chunk(chunk: &Chunk, score: f32) -> Self {
        Self {
            chunk_id: chunk.chunk_id,
            page_num: chunk.page_num,
            content: chunk.content.clone(),
            preview: chunk.preview(),
            score,
        }
    }
}

/// 加载结果摘要；命中缓存时 cached = true
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub file_name: String,
    pub file_type: String,
    pub total_pages: usize,
    pub total_chunks: usize,
    pub total_characters: usize,
    pub cached: bool,
}

//! 材料层错误类型
//!
//! 加载类错误（不支持的类型、文件缺失、解析失败）由 load 返回；
//! 嵌入类错误只在向量索引内部记录日志，不向上传播。

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaterialError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Material not found: {}", .0.display())]
    MaterialNotFound(PathBuf),

    #[error("Failed to parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 单个块嵌入失败：该块从向量索引中丢弃
    #[error("Failed to embed chunk {chunk_id}: {reason}")]
    EmbeddingFailure { chunk_id: usize, reason: String },

    /// 查询嵌入失败：语义检索降级为空结果
    #[error("Failed to embed query: {0}")]
    QueryEmbeddingFailure(String),
}

//! 学习材料检索引擎
//!
//! - **chunker**: 按页、按段落的重叠分块
//! - **keyword**: 词集重合 + 完整短语命中的关键词打分
//! - **vector**: 基于嵌入的余弦相似度检索
//! - **loader**: PDF / 纯文本读取
//! - **store**: 按路径缓存的材料库，统一检索入口

pub mod chunker;
pub mod error;
pub mod keyword;
pub mod loader;
pub mod store;
pub mod tokenizer;
pub mod types;
pub mod vector;

pub use chunker::{Chunker, ChunkingConfig};
pub use error::MaterialError;
pub use keyword::KeywordIndex;
pub use loader::{DocumentParser, FileKind, PdfExtractParser};
pub use store::MaterialStore;
pub use types::{Chunk, ChunkHit, LoadSummary, Page, PREVIEW_CHARS};
pub use vector::{cosine_similarity, VectorIndex};

//! 材料库：按规范化绝对路径缓存每份文档的分块与两种索引，并提供统一的检索入口
//!
//! 检索类方法都接受可选的材料路径，省略时作用于当前活动材料；
//! 找不到材料时返回空结果而不是错误。

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::llm::EmbeddingProvider;
use crate::materials::loader::{load_pages, DocumentParser, PdfExtractParser};
use crate::materials::{
    Chunk, ChunkHit, Chunker, ChunkingConfig, KeywordIndex, LoadSummary, MaterialError,
    VectorIndex,
};

/// 单份文档的索引条目
struct MaterialIndex {
    /// 原始页文本（页码 → 文本）
    pages: BTreeMap<u32, String>,
    chunks: Vec<Chunk>,
    keyword: KeywordIndex,
    vector: VectorIndex,
    summary: LoadSummary,
}

/// 材料库
pub struct MaterialStore {
    chunker: Chunker,
    embedding_model: String,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    parser: Arc<dyn DocumentParser>,
    entries: HashMap<PathBuf, MaterialIndex>,
    /// 调用方给出的绝对路径 → 规范化路径；文件删除后仍能按原路径查找
    aliases: HashMap<PathBuf, PathBuf>,
    active: Option<PathBuf>,
}

impl MaterialStore {
    pub fn new(
        chunking: ChunkingConfig,
        embedding_model: impl Into<String>,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Self {
        Self {
            chunker: Chunker::new(chunking),
            embedding_model: embedding_model.into(),
            embedder,
            parser: Arc::new(PdfExtractParser),
            entries: HashMap::new(),
            aliases: HashMap::new(),
            active: None,
        }
    }

    /// 替换 PDF 解析器
    pub fn with_parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parser = parser;
        self
    }

    /// 加载文档并建立索引；已缓存且未强制重载时直接返回缓存摘要（cached = true）
    pub async fn load(
        &mut self,
        path: &Path,
        force_reload: bool,
    ) -> Result<LoadSummary, MaterialError> {
        let canonical = tokio::fs::canonicalize(path)
            .await
            .map_err(|_| MaterialError::MaterialNotFound(path.to_path_buf()))?;

        if let Ok(abs) = std::path::absolute(path) {
            if abs != canonical {
                self.aliases.insert(abs, canonical.clone());
            }
        }

        if !force_reload {
            if let Some(entry) = self.entries.get(&canonical) {
                tracing::info!(path = %canonical.display(), "material already loaded, using cache");
                let mut summary = entry.summary.clone();
                summary.cached = true;
                self.active = Some(canonical);
                return Ok(summary);
            }
        }

        let doc = load_pages(&canonical, self.parser.clone()).await?;
        let chunks = self.chunker.chunk(&doc.pages, doc.kind.as_str());
        let keyword = KeywordIndex::new(&chunks);
        let mut vector = VectorIndex::new(self.embedding_model.clone(), self.embedder.clone());
        let embedded = vector.add(&chunks).await;

        let file_name = canonical
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let summary = LoadSummary {
            file_name,
            file_type: doc.kind.as_str().to_string(),
            total_pages: doc.pages.len(),
            total_chunks: chunks.len(),
            total_characters: doc.total_characters,
            cached: false,
        };
        tracing::info!(
            path = %canonical.display(),
            pages = summary.total_pages,
            chunks = summary.total_chunks,
            embedded,
            "material loaded"
        );

        let pages = doc.pages.into_iter().map(|p| (p.number, p.text)).collect();
        self.entries.insert(
            canonical.clone(),
            MaterialIndex {
                pages,
                chunks,
                keyword,
                vector,
                summary: summary.clone(),
            },
        );
        self.active = Some(canonical);
        Ok(summary)
    }

    /// 把调用方给出的路径映射为缓存键（不访问文件系统）
    fn cache_key(&self, path: &Path) -> Option<PathBuf> {
        let abs = std::path::absolute(path).ok()?;
        if self.entries.contains_key(&abs) {
            return Some(abs);
        }
        self.aliases.get(&abs).cloned()
    }

    /// 按显式路径或活动材料查找条目
    fn resolve(&self, material: Option<&Path>) -> Option<&MaterialIndex> {
        match material {
            Some(p) => self.cache_key(p).and_then(|k| self.entries.get(&k)),
            None => self.active.as_ref().and_then(|a| self.entries.get(a)),
        }
    }

    pub fn keyword_search(&self, query: &str, top_k: usize, material: Option<&Path>) -> Vec<ChunkHit> {
        self.resolve(material)
            .map(|m| m.keyword.search(query, top_k))
            .unwrap_or_default()
    }

    pub async fn semantic_search(
        &self,
        query: &str,
        top_k: usize,
        material: Option<&Path>,
    ) -> Vec<ChunkHit> {
        match self.resolve(material) {
            Some(m) => m.vector.search(query, top_k).await,
            None => Vec::new(),
        }
    }

    /// 原始页文本；页不存在时为空串
    pub fn get_page_content(&self, page_num: u32, material: Option<&Path>) -> String {
        self.resolve(material)
            .and_then(|m| m.pages.get(&page_num).cloned())
            .unwrap_or_default()
    }

    pub fn get_chunk_by_id(&self, chunk_id: usize, material: Option<&Path>) -> Option<ChunkHit> {
        self.resolve(material)
            .and_then(|m| m.chunks.get(chunk_id))
            .map(|c| ChunkHit::from_chunk(c, 0.0))
    }

    /// 清除指定材料（None 则全部）；活动材料被清除时改为任一剩余材料
    pub fn clear_cache(&mut self, material: Option<&Path>) {
        match material {
            Some(p) => {
                let Some(key) = self.cache_key(p).filter(|k| self.entries.contains_key(k)) else {
                    tracing::warn!(path = %p.display(), "material not cached, nothing evicted");
                    return;
                };
                self.entries.remove(&key);
                self.aliases.retain(|_, target| *target != key);
                tracing::info!(path = %key.display(), "material evicted");
                if self.active.as_ref() == Some(&key) {
                    self.active = self.entries.keys().next().cloned();
                }
            }
            None => {
                self.entries.clear();
                self.aliases.clear();
                self.active = None;
            }
        }
    }

    /// 已缓存材料的规范化路径（排序）
    pub fn loaded_materials(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.entries.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn active(&self) -> Option<&Path> {
        self.active.as_deref()
    }

    pub fn summary(&self, material: Option<&Path>) -> Option<&LoadSummary> {
        self.resolve(material).map(|m| &m.summary)
    }
}

impl Default for MaterialStore {
    fn default() -> Self {
        Self::new(ChunkingConfig::default(), "text-embedding-3-small", None)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::llm::mock::MockEmbedder;

    struct FakePdf;

    impl DocumentParser for FakePdf {
        fn parse_pdf(&self, _path: &Path) -> Result<Vec<String>, String> {
            Ok(vec![
                "Linear programming basics.\n\nThe feasible region is convex.".to_string(),
                "   ".to_string(),
                "The dual simplex method keeps dual feasibility.".to_string(),
            ])
        }
    }

    fn text_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    fn store() -> MaterialStore {
        MaterialStore::new(
            ChunkingConfig::default(),
            "mock",
            Some(Arc::new(MockEmbedder::default())),
        )
        .with_parser(Arc::new(FakePdf))
    }

    #[tokio::test]
    async fn test_second_load_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = text_file(&dir, "notes.md", "alpha beta\n\ngamma delta");
        let mut store = store();

        let first = store.load(&path, false).await.unwrap();
        assert!(!first.cached);
        assert_eq!(first.file_name, "notes.md");
        assert_eq!(first.file_type, "text");
        assert_eq!(first.total_pages, 1);
        assert_eq!(first.total_characters, 23);

        let second = store.load(&path, false).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.total_chunks, first.total_chunks);
        assert_eq!(store.loaded_materials().len(), 1);
    }

    #[tokio::test]
    async fn test_force_reload_rebuilds() {
        let dir = tempfile::tempdir().unwrap();
        let path = text_file(&dir, "a.txt", "one");
        let mut store = store();
        store.load(&path, false).await.unwrap();

        std::fs::write(&path, "one\n\ntwo").unwrap();
        let reloaded = store.load(&path, true).await.unwrap();
        assert!(!reloaded.cached);
        assert_eq!(store.get_page_content(1, None), "one\n\ntwo");
        assert_eq!(store.loaded_materials().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_and_unsupported_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = store();

        let missing = store.load(&dir.path().join("nope.pdf"), false).await;
        assert!(matches!(missing, Err(MaterialError::MaterialNotFound(_))));

        let docx = text_file(&dir, "slides.docx", "x");
        let unsupported = store.load(&docx, false).await;
        assert!(matches!(unsupported, Err(MaterialError::UnsupportedFileType(_))));
        assert!(store.loaded_materials().is_empty());
        assert!(store.active().is_none());
    }

    #[tokio::test]
    async fn test_pdf_pages_and_retrieval() {
        let dir = tempfile::tempdir().unwrap();
        let path = text_file(&dir, "book.pdf", "%PDF-fake");
        let mut store = store();

        let summary = store.load(&path, false).await.unwrap();
        assert_eq!(summary.file_type, "pdf");
        assert_eq!(summary.total_pages, 2);
        assert_eq!(summary.total_chunks, 2);

        assert_eq!(store.get_page_content(2, None), "");
        assert!(store.get_page_content(3, None).starts_with("The dual simplex"));

        let hits = store.keyword_search("dual simplex", 3, None);
        assert_eq!(hits[0].page_num, 3);

        let sem = store.semantic_search("dual simplex method", 3, None).await;
        assert_eq!(sem.len(), 2);
        assert_eq!(sem[0].chunk_id, 1);

        let chunk = store.get_chunk_by_id(0, None).unwrap();
        assert_eq!(chunk.page_num, 1);
        assert!(store.get_chunk_by_id(9, None).is_none());
    }

    #[tokio::test]
    async fn test_active_material_switching_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let a = text_file(&dir, "a.txt", "apples and pears");
        let b = text_file(&dir, "b.txt", "bananas only");
        let mut store = store();

        store.load(&a, false).await.unwrap();
        store.load(&b, false).await.unwrap();
        assert_eq!(store.keyword_search("apples", 3, None).len(), 0);
        assert_eq!(store.keyword_search("apples", 3, Some(&a)).len(), 1);

        // 重新加载已缓存的 a 会将其设为活动材料
        store.load(&a, false).await.unwrap();
        assert_eq!(store.keyword_search("apples", 3, None).len(), 1);

        store.clear_cache(Some(&a));
        assert_eq!(store.loaded_materials().len(), 1);
        assert!(store.active().is_some());
        assert_eq!(store.keyword_search("bananas", 3, None).len(), 1);

        store.clear_cache(Some(&a));
        assert_eq!(store.loaded_materials().len(), 1);

        store.clear_cache(None);
        assert!(store.loaded_materials().is_empty());
        assert!(store.active().is_none());
        assert!(store.keyword_search("bananas", 3, None).is_empty());
        assert!(store.semantic_search("bananas", 3, None).await.is_empty());
    }

    #[tokio::test]
    async fn test_evict_after_file_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let path = text_file(&dir, "notes.md", "simplex pivots");
        let mut store = store();
        store.load(&path, false).await.unwrap();

        std::fs::remove_file(&path).unwrap();
        assert_eq!(store.keyword_search("simplex", 3, Some(&path)).len(), 1);
        assert!(store.summary(Some(&path)).is_some());

        store.clear_cache(Some(&path));
        assert!(store.loaded_materials().is_empty());
        assert!(store.active().is_none());
        assert!(store.summary(Some(&path)).is_none());
    }
}

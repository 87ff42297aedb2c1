//! 工具分发器
//!
//! 将模型的 ToolCall 转为 MaterialTool，调用 MaterialStore 对应方法，并把结果格式化为给模型看的文本。
//! 未知工具与参数错误渲染为固定提示串，不向上抛错；每次调用输出结构化审计日志（JSON）。

use std::time::Instant;

use crate::materials::{ChunkHit, MaterialStore};
use crate::react::planner::ToolCall;
use crate::tools::schema::{MaterialTool, SearchArgs};

pub const NO_RESULTS: &str = "未找到相关内容";
pub const PAGE_NOT_FOUND: &str = "页面未找到或为空";
pub const CHUNK_NOT_FOUND: &str = "未找到指定的文本块";

/// 工具分发器：持有检索的默认 top_k
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    default_top_k: usize,
}

impl ToolDispatcher {
    pub fn new(default_top_k: usize) -> Self {
        Self { default_top_k }
    }

    /// 执行一次工具调用，返回给模型的文本（不会失败）
    pub async fn dispatch(&self, call: &ToolCall, store: &MaterialStore) -> String {
        let start = Instant::now();
        let (outcome, text) = match MaterialTool::try_from(call) {
            Ok(tool) => {
                let text = self.run(&tool, store).await;
                ("ok", text)
            }
            Err(e) => ("rejected", e.to_string()),
        };

        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": call.tool,
            "outcome": outcome,
            "duration_ms": start.elapsed().as_millis() as u64,
            "args_preview": args_preview(&call.args),
            "result_chars": text.chars().count(),
        });
        tracing::info!(audit = %audit.to_string(), "tool");
        text
    }

    async fn run(&self, tool: &MaterialTool, store: &MaterialStore) -> String {
        match tool {
            MaterialTool::KeywordSearch(SearchArgs { query, top_k }) => {
                let hits = store.keyword_search(query, top_k.unwrap_or(self.default_top_k), None);
                format_search_results(&hits)
            }
            MaterialTool::SemanticSearch(SearchArgs { query, top_k }) => {
                let hits = store
                    .semantic_search(query, top_k.unwrap_or(self.default_top_k), None)
                    .await;
                format_search_results(&hits)
            }
            MaterialTool::GetPageContent(args) => {
                let content = store.get_page_content(args.page_num, None);
                if content.is_empty() {
                    PAGE_NOT_FOUND.to_string()
                } else {
                    content
                }
            }
            MaterialTool::GetChunkById(args) => match store.get_chunk_by_id(args.chunk_id, None) {
                Some(hit) => format!("第 {} 页的内容：\n{}", hit.page_num, hit.content),
                None => CHUNK_NOT_FOUND.to_string(),
            },
        }
    }
}

impl Default for ToolDispatcher {
    fn default() -> Self {
        Self::new(3)
    }
}

/// 检索结果列表：编号、页码、预览与内部标识
pub fn format_search_results(hits: &[ChunkHit]) -> String {
    if hits.is_empty() {
        return NO_RESULTS.to_string();
    }
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "[结果 {}] 第 {} 页\n{}\n(内部标识: chunk_{})\n",
                i + 1,
                hit.page_num,
                hit.preview,
                hit.chunk_id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn args_preview(args: &serde_json::Value) -> String {
    let s = args.to_string();
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

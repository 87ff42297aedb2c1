//! 文档分块器
//!
//! 逐页按空行切段落，贪心累积到缓冲区；再加一段会超过 chunk_size 时输出一块，
//! 并以上一块末尾 chunk_overlap 个字符 + 新段落作为下一块的开头。重叠不跨页，段落不拆分。

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::materials::{Chunk, Page};

/// 段落之间的分隔符
const SEPARATOR: &str = "\n\n";
const SEPARATOR_CHARS: usize = 2;

static BLANK_LINE_RE: OnceLock<Regex> = OnceLock::new();

fn blank_line_re() -> &'static Regex {
    BLANK_LINE_RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("static regex"))
}

/// 分块配置（长度均按字符计）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// 按空行切分段落，去掉首尾空白并跳过空段落
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    blank_line_re()
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// 取字符串末尾 n 个字符（UTF-8 安全）
fn tail_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match s.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

/// 页内累积缓冲区
#[derive(Default)]
struct Buffer {
    text: String,
    chars: usize,
    overlap: usize,
}

impl Buffer {
    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn push(&mut self, para: &str, para_chars: usize) {
        if !self.text.is_empty() {
            self.text.push_str(SEPARATOR);
            self.chars += SEPARATOR_CHARS;
        }
        self.text.push_str(para);
        self.chars += para_chars;
    }
}

/// 文档分块器
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// 将各页文本分块；chunk_id 跨页全局连续，从 0 开始
    pub fn chunk(&self, pages: &[Page], source: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for page in pages {
            self.chunk_page(page, source, &mut chunks);
        }
        chunks
    }

    fn chunk_page(&self, page: &Page, source: &str, out: &mut Vec<Chunk>) {
        let ChunkingConfig {
            chunk_size,
            chunk_overlap,
        } = self.config;
        let mut buf = Buffer::default();

        for para in split_paragraphs(&page.text) {
            let para_chars = para.chars().count();

            if !buf.is_empty() && buf.chars + SEPARATOR_CHARS + para_chars > chunk_size {
                let flushed = std::mem::take(&mut buf);
                // 超长段落单独成块，不带重叠；其余情况重叠只在必要时缩短，保证新块不超过 chunk_size + chunk_overlap
                let keep = if para_chars > chunk_size {
                    0
                } else {
                    let room = (chunk_size + chunk_overlap).saturating_sub(SEPARATOR_CHARS + para_chars);
                    chunk_overlap.min(room).min(flushed.chars)
                };
                if keep > 0 {
                    buf.text.push_str(tail_chars(&flushed.text, keep));
                    buf.chars = keep;
                    buf.overlap = keep;
                }
                push_chunk(out, page.number, source, flushed);
            }

            buf.push(para, para_chars);
        }

        if !buf.is_empty() {
            push_chunk(out, page.number, source, buf);
        }
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

fn push_chunk(out: &mut Vec<Chunk>, page_num: u32, source: &str, buf: Buffer) {
    let mut metadata = HashMap::new();
    metadata.insert("source".to_string(), source.to_string());
    metadata.insert("overlap_chars".to_string(), buf.overlap.to_string());
    out.push(Chunk {
        content: buf.text,
        page_num,
        chunk_id: out.len(),
        metadata,
    });
}

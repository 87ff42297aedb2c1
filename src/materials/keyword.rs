//! 关键词索引
//!
//! 分数 = 查询词集与块词集的交集大小 + 10 × 完整查询串在块中的出现次数（均大小写无关）。
//! 块的词集在建索引时一次算好。

use std::collections::HashSet;

use crate::materials::tokenizer::{overlap_score, tokenize_to_set};
use crate::materials::{Chunk, ChunkHit};

/// 完整查询串每出现一次的加分
const PHRASE_WEIGHT: usize = 10;

struct Entry {
    chunk: Chunk,
    lower: String,
    tokens: HashSet<String>,
}

/// 关键词索引：持有块及其小写文本与词集
pub struct KeywordIndex {
    entries: Vec<Entry>,
}

impl KeywordIndex {
    pub fn new(chunks: &[Chunk]) -> Self {
        let entries = chunks
            .iter()
            .map(|c| Entry {
                chunk: c.clone(),
                lower: c.content.to_lowercase(),
                tokens: tokenize_to_set(&c.content),
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 对单个块打分
    fn score(&self, entry: &Entry, query_lower: &str, query_tokens: &HashSet<String>) -> usize {
        let phrase_hits = if query_lower.is_empty() {
            0
        } else {
            entry.lower.matches(query_lower).count()
        };
        overlap_score(query_tokens, &entry.tokens) + PHRASE_WEIGHT * phrase_hits
    }

    /// 返回分数大于 0 的前 top_k 个块，分数降序；同分保持块原有顺序
    pub fn search(&self, query: &str, top_k: usize) -> Vec<ChunkHit> {
        let query_lower = query.trim().to_lowercase();
        let query_tokens = tokenize_to_set(&query_lower);

        let mut scored: Vec<(usize, &Chunk)> = self
            .entries
            .iter()
            .map(|e| (self.score(e, &query_lower, &query_tokens), &e.chunk))
            .filter(|(score, _)| *score > 0)
            .collect();

        // sort_by 为稳定排序
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .into_iter()
            .take(top_k)
            .map(|(score, chunk)| ChunkHit::from_chunk(chunk, score as f32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Chunk {
                content: t.to_string(),
                page_num: (i + 1) as u32,
                chunk_id: i,
                metadata: HashMap::new(),
            })
            .collect()
    }

    #[test]
    fn test_verbatim_match_outranks_word_overlap() {
        let index = KeywordIndex::new(&chunks(&[
            "The method of simplex pivots is dual to other approaches.",
            "We now introduce the dual simplex method for bounded problems.",
        ]));
        let hits = index.search("dual simplex method", 5);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk_id, 1);
        assert!(hits[0].score > hits[1].score);
        assert_eq!(hits[0].score, 13.0);
        assert_eq!(hits[1].score, 3.0);
    }

    #[test]
    fn test_zero_scores_are_excluded() {
        let index = KeywordIndex::new(&chunks(&["linear programming", "graph coloring"]));
        let hits = index.search("Linear", 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk_id, 0);
        assert!(index.search("nonexistent", 5).is_empty());
    }

    #[test]
    fn test_top_k_and_non_increasing_scores() {
        let index = KeywordIndex::new(&chunks(&[
            "cost",
            "cost cost function",
            "minimize cost function",
            "minimize the cost function subject to constraints",
            "constraints only",
        ]));
        for k in 0..6 {
            let hits = index.search("minimize cost function", k);
            assert!(hits.len() <= k);
            for w in hits.windows(2) {
                assert!(w[0].score >= w[1].score);
            }
        }
    }

    #[test]
    fn test_ties_keep_chunk_order() {
        let index = KeywordIndex::new(&chunks(&["alpha beta", "beta gamma", "beta delta"]));
        let hits = index.search("beta", 3);
        let ids: Vec<usize> = hits.iter().map(|h| h.chunk_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_phrase_occurrences_are_counted() {
        let index = KeywordIndex::new(&chunks(&["LP lp Lp"]));
        let hits = index.search("lp", 1);
        // 1 个词重合 + 3 次完整出现
        assert_eq!(hits[0].score, 31.0);
    }
}

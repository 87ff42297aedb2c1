//! 分词模块
//!
//! 关键词检索用的大小写无关词集合：先按 `\w+` 切出词串，含 CJK 字符的词串再交给 jieba 细分。

use std::collections::HashSet;
use std::sync::OnceLock;

use jieba_rs::Jieba;
use regex::Regex;

static JIEBA: OnceLock<Jieba> = OnceLock::new();
static WORD_RE: OnceLock<Regex> = OnceLock::new();

fn get_jieba() -> &'static Jieba {
    JIEBA.get_or_init(Jieba::new)
}

fn word_re() -> &'static Regex {
    WORD_RE.get_or_init(|| Regex::new(r"\w+").expect("static regex"))
}

/// 判断字符是否为 CJK（中日韩）字符
fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}' |   // CJK Unified Ideographs
        '\u{3400}'..='\u{4DBF}' |   // CJK Unified Ideographs Extension A
        '\u{F900}'..='\u{FAFF}' |   // CJK Compatibility Ideographs
        '\u{3040}'..='\u{309F}' |   // Hiragana
        '\u{30A0}'..='\u{30FF}'     // Katakana
    )
}

/// 判断文本是否包含 CJK 字符
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

/// 分词：返回小写词序列（可能重复）
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tokens = Vec::new();
    for m in word_re().find_iter(&lower) {
        let word = m.as_str();
        if contains_cjk(word) {
            // 搜索引擎模式，粒度更细，便于与提问中的短词重合
            tokens.extend(
                get_jieba()
                    .cut_for_search(word, true)
                    .into_iter()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from),
            );
        } else {
            tokens.push(word.to_string());
        }
    }
    tokens
}

/// 分词并返回词集合
pub fn tokenize_to_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// 两个词集合的重叠分数（交集大小）
pub fn overlap_score(set1: &HashSet<String>, set2: &HashSet<String>) -> usize {
    set1.intersection(set2).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_english_is_case_insensitive() {
        let tokens = tokenize_to_set("Simplex METHOD, simplex method!");
        assert_eq!(tokens.len(), 2);
        assert!(tokens.contains("simplex"));
        assert!(tokens.contains("method"));
    }

    #[test]
    fn test_tokenize_keeps_numbers_and_underscores() {
        let tokens = tokenize("x_1 + 2x_2 <= 10");
        assert_eq!(tokens, vec!["x_1", "2x_2", "10"]);
    }

    #[test]
    fn test_tokenize_chinese() {
        let tokens = tokenize("线性规划的标准形式");
        assert!(!tokens.is_empty());
        assert!(tokens.iter().any(|t| t.contains("线性") || t.contains("规划")));
    }

    #[test]
    fn test_tokenize_mixed() {
        let tokens = tokenize("单纯形法 Simplex");
        assert!(tokens.iter().any(|t| t == "simplex"));
        assert!(tokens.iter().any(|t| contains_cjk(t)));
    }

    #[test]
    fn test_overlap_score() {
        let a = tokenize_to_set("dual simplex method");
        let b = tokenize_to_set("the simplex method");
        assert_eq!(overlap_score(&a, &b), 2);
    }

    #[test]
    fn test_contains_cjk() {
        assert!(contains_cjk("你好"));
        assert!(!contains_cjk("Hello World"));
    }
}

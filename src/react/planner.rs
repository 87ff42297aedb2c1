//! Planner：模型调用与输出解析
//!
//! plan 拼接 system + 历史后调用 LLM（带请求超时）；parse_llm_output 从文本中提取 JSON 工具调用，
//! extract_code_block 从回复中取出代码块，is_intermediate_reasoning 识别「还没说完」的中间思考。

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::AgentError;
use crate::llm::{CompletionOptions, LlmClient};
use crate::memory::Message;

/// LLM 返回的 Tool Call（简化 JSON：{"tool": "keyword_search", "args": {"query": "..."}}）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// Planner 输出
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerOutput {
    /// 直接回复用户
    Response(String),
    /// 需要执行工具
    ToolCall(ToolCall),
}

/// 解析 LLM 输出：若含有效 JSON 且 tool 非空则为 ToolCall，否则为 Response
///
/// 只有看起来像工具调用（含 `"tool"` 键）却无法解析时才返回 JsonParseError；
/// 普通回答里出现的花括号（如集合记号）按文本处理。
pub fn parse_llm_output(output: &str) -> Result<PlannerOutput, AgentError> {
    let trimmed = output.trim();

    // 尝试提取 JSON 块（```json ... ``` 或纯 JSON）
    let json_str = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        rest.find("```")
            .map(|end| rest[..end].trim())
            .unwrap_or(rest.trim())
    } else if let Some(start) = trimmed.find('{') {
        if let Some(end) = trimmed.rfind('}') {
            &trimmed[start..=end]
        } else {
            trimmed
        }
    } else {
        return Ok(PlannerOutput::Response(trimmed.to_string()));
    };

    let parsed: ToolCall = match serde_json::from_str(json_str) {
        Ok(p) => p,
        Err(e) if json_str.contains("\"tool\"") => {
            return Err(AgentError::JsonParseError(format!("{}: {}", e, json_str)));
        }
        Err(_) => return Ok(PlannerOutput::Response(trimmed.to_string())),
    };

    if parsed.tool.is_empty() {
        Ok(PlannerOutput::Response(trimmed.to_string()))
    } else {
        Ok(PlannerOutput::ToolCall(parsed))
    }
}

static CODE_BLOCK_RE: OnceLock<Regex> = OnceLock::new();

fn code_block_re() -> &'static Regex {
    CODE_BLOCK_RE.get_or_init(|| Regex::new(r"(?s)```([A-Za-z0-9_+-]*)[ \t]*\r?\n(.*?)```").expect("static regex"))
}

/// 提取代码：优先第一个标记为 python/py/python3 的代码块，其次第一个无语言标记的代码块
pub fn extract_code_block(text: &str) -> Option<String> {
    let blocks: Vec<(String, &str)> = code_block_re()
        .captures_iter(text)
        .filter_map(|c| {
            let lang = c.get(1)?.as_str().to_ascii_lowercase();
            let body = c.get(2)?.as_str();
            Some((lang, body))
        })
        .collect();

    blocks
        .iter()
        .find(|(lang, _)| matches!(lang.as_str(), "python" | "py" | "python3"))
        .or_else(|| blocks.iter().find(|(lang, _)| lang.is_empty()))
        .map(|(_, body)| body.trim().to_string())
        .filter(|code| !code.is_empty())
}

/// 中间思考的话语标记：模型说「让我先查一下」之类却没有给出工具调用
const REASONING_MARKERS: &[&str] = &[
    "让我", "我将", "让我们", "首先", "接下来", "然后", "let me", "i will", "i'll", "let's",
    "first,", "next,",
];

/// 文本是否带有中间思考标记（大小写无关）
pub fn is_intermediate_reasoning(text: &str) -> bool {
    let lower = text.to_lowercase();
    REASONING_MARKERS.iter().any(|m| lower.contains(m))
}

/// Planner：持有 LLM 与请求超时，负责拼 system + messages 后调用 LLM
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    request_timeout: Duration,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>, request_timeout_secs: u64) -> Self {
        Self {
            llm,
            request_timeout: Duration::from_secs(request_timeout_secs),
        }
    }

    /// 获取 LLM 累计 token 使用统计
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.llm.token_usage()
    }

    /// 调用模型；超时返回 NetworkTimeout，其余失败返回 LlmError
    pub async fn plan_with_system(
        &self,
        system: &str,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, AgentError> {
        let mut full_messages = Vec::with_capacity(messages.len() + 1);
        if !system.is_empty() {
            full_messages.push(Message::system(system.to_string()));
        }
        full_messages.extend_from_slice(messages);

        tokio::time::timeout(self.request_timeout, self.llm.complete(&full_messages, options))
            .await
            .map_err(|_| AgentError::NetworkTimeout)?
            .map_err(AgentError::LlmError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    #[test]
    fn test_parse_plain_json_tool_call() {
        let out = parse_llm_output(r#"{"tool": "keyword_search", "args": {"query": "dual"}}"#).unwrap();
        match out {
            PlannerOutput::ToolCall(c) => {
                assert_eq!(c.tool, "keyword_search");
                assert_eq!(c.args["query"], "dual");
            }
            other => panic!("expected tool call, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_fenced_tool_call() {
        let text = "我先搜索一下。\n```json\n{\"tool\": \"get_page_content\", \"args\": {\"page_num\": 3}}\n```";
        assert!(matches!(parse_llm_output(text).unwrap(), PlannerOutput::ToolCall(_)));
    }

    #[test]
    fn test_parse_plain_answer_and_braces() {
        assert_eq!(
            parse_llm_output("答案见第 3 页。").unwrap(),
            PlannerOutput::Response("答案见第 3 页。".into())
        );
        // 集合记号不是工具调用
        assert!(matches!(
            parse_llm_output("可行域为 {x | Ax <= b}。").unwrap(),
            PlannerOutput::Response(_)
        ));
    }

    #[test]
    fn test_parse_broken_tool_call_is_error() {
        let err = parse_llm_output(r#"{"tool": "keyword_search", "args": {"query": }"#).unwrap_err();
        assert!(matches!(err, AgentError::JsonParseError(_)));
    }

    #[test]
    fn test_extract_code_block_prefers_python() {
        let text = "## Python Code\n```\nplain\n```\n```python\nprint(1)\n```";
        assert_eq!(extract_code_block(text).as_deref(), Some("print(1)"));

        let text = "```\nx = 2\nprint(x)\n```";
        assert_eq!(extract_code_block(text).as_deref(), Some("x = 2\nprint(x)"));

        assert!(extract_code_block("```bash\nls\n```").is_none());
        assert!(extract_code_block("no code here").is_none());
    }

    #[test]
    fn test_intermediate_reasoning_markers() {
        assert!(is_intermediate_reasoning("让我再查一下第 5 页"));
        assert!(is_intermediate_reasoning("Let me look at the dual problem."));
        assert!(!is_intermediate_reasoning("对偶问题的最优值等于原问题的最优值。"));
    }

    #[tokio::test]
    async fn test_plan_with_system_prepends_system() {
        let llm = Arc::new(MockLlmClient::with_script(["ok"]));
        let planner = Planner::new(llm.clone(), 5);
        let out = planner
            .plan_with_system("SYS", &[Message::user("q")], &CompletionOptions::default())
            .await
            .unwrap();
        assert_eq!(out, "ok");
        let sent = llm.call_messages(0).unwrap();
        assert_eq!(sent[0], Message::system("SYS"));
        assert_eq!(sent[1], Message::user("q"));
    }
}

//! 提示词：三个角色的默认 system prompt，以及 tutor / solver / 反思各阶段的消息模板

use crate::materials::LoadSummary;
use crate::tools::{declarations_json, tool_call_schema_json};

pub const DEFAULT_TUTOR_PROMPT: &str = "You are a patient teaching assistant for an operations research course. \
Answer the student's question using the loaded course materials, explain the reasoning step by step, \
and ground every claim in the materials.";

pub const DEFAULT_SOLVER_PROMPT: &str = "You are an expert in mathematical optimization. \
Given a problem description, identify its type (LP, IP, MILP, NLP, ...), formulate it precisely, \
and write a self-contained Python program that solves it and prints the optimal solution and objective value.";

pub const DEFAULT_CODE_EXECUTOR_PROMPT: &str = "You are a careful Python engineer. \
You fix programs based on the error output and return only the corrected code.";

/// 模型在中间思考后停下时追加的提示
pub const CONTINUE_NUDGE: &str = "请继续查找信息并完成回答，不要停下来。";

/// 模型返回空内容时的结果
pub const NO_RESPONSE: &str = "抱歉，模型没有返回任何内容。";

/// 工具调用 JSON 无法解析时的纠正提示
pub fn format_correction(error: &str) -> String {
    format!(
        "你的工具调用不是合法的 JSON（{}）。请只输出一个 JSON 对象，格式为 {{\"tool\": \"<工具名>\", \"args\": {{...}}}}，或者直接给出最终回答。",
        error
    )
}

/// 循环用尽时的结果
pub fn timeout_message(tool_calls: usize) -> String {
    format!("抱歉，处理超时。已调用工具 {} 次，但未能完成回答。", tool_calls)
}

/// 材料摘要行
pub fn material_line(summary: &LoadSummary) -> String {
    format!(
        "- {}: {} pages, {} chunks",
        summary.file_name, summary.total_pages, summary.total_chunks
    )
}

/// tutor 的完整 system 指令：角色提示 + 工具声明与调用格式 + 材料列表 + 工作与引用规则
pub fn tutor_instruction(base_prompt: &str, material_lines: &[String]) -> String {
    let materials = if material_lines.is_empty() {
        "(no materials loaded)".to_string()
    } else {
        material_lines.join("\n")
    };
    format!(
        r#"{base}

Available Materials:
{materials}

You have access to the following tools to search and retrieve information from the materials:
1. keyword_search: Search for specific keywords or terms
2. semantic_search: Search for semantically related content
3. get_page_content: Get full content of a specific page
4. get_chunk_by_id: Get full content of a specific chunk (use the chunk_id from search results)

Tool declarations:
```json
{declarations}
```

To call a tool, reply with ONLY one JSON object matching this schema, and nothing else:
```json
{call_schema}
```
Example: {{"tool": "keyword_search", "args": {{"query": "对偶理论", "top_k": 3}}}}
The tool result will be returned to you as {{"function_response": {{"name": ..., "result": ...}}}}.

INSTRUCTIONS:
- Use the tools MULTIPLE TIMES to gather comprehensive information
- Work CONTINUOUSLY without stopping to ask for permission
- Call tools as many times as needed (you can make 8-10 tool calls)
- Only provide your final answer when you have sufficient information
- If you say "let me check X", immediately call the appropriate tool to check X

CITATION FORMAT (CRITICAL):
- In your FINAL ANSWER, cite sources using "第 X 页" or "第 X 章"
- DO NOT use "Chunk X" or "chunk_id" in your final answer - these are internal identifiers
- The search results show page numbers - use those for citations
- Example: "根据第 5 页的内容..." NOT "根据 Chunk 13..."
- Make your answer readable and professional for students"#,
        base = base_prompt,
        materials = materials,
        declarations = declarations_json(),
        call_schema = tool_call_schema_json(),
    )
}

/// tutor 的首条 user 消息
pub fn tutor_question(question: &str) -> String {
    format!(
        "Student Question:\n{}\n\nStart by searching for relevant information, then continue gathering more details until you can provide a complete answer with proper page-based citations.",
        question
    )
}

/// solver 的 user 消息：问题 + 规定的回答结构
pub fn solver_request(problem: &str) -> String {
    format!(
        r#"Optimization Problem:
{problem}

Please:
1. Identify the problem type
2. Formulate the mathematical model
3. Generate Python code to solve it
4. Provide the solution

Format your response as:
## Problem Analysis
[Your analysis]

## Mathematical Formulation
[Variables, objective, constraints]

## Python Code
```python
[Your code]
```

## Solution Approach
[Explanation]"#,
        problem = problem
    )
}

/// 反思修复的 user 消息：失败的代码与错误输出
pub fn reflection_request(code: &str, error: &str) -> String {
    format!(
        "The following code produced an error:\n\n```python\n{}\n```\n\nError message:\n```\n{}\n```\n\nPlease fix the code and provide only the corrected Python code without explanation.",
        code, error
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tutor_instruction_lists_materials_and_rules() {
        let summary = LoadSummary {
            file_name: "lp.pdf".into(),
            file_type: "pdf".into(),
            total_pages: 12,
            total_chunks: 30,
            total_characters: 9000,
            cached: false,
        };
        let text = tutor_instruction("BASE", &[material_line(&summary)]);
        assert!(text.starts_with("BASE"));
        assert!(text.contains("- lp.pdf: 12 pages, 30 chunks"));
        assert!(text.contains("get_chunk_by_id"));
        assert!(text.contains("第 X 页"));
    }

    #[test]
    fn test_solver_request_layout() {
        let text = solver_request("max x + y");
        for section in [
            "## Problem Analysis",
            "## Mathematical Formulation",
            "## Python Code",
            "```python",
            "## Solution Approach",
        ] {
            assert!(text.contains(section), "missing {}", section);
        }
    }

    #[test]
    fn test_timeout_message() {
        assert_eq!(timeout_message(10), "抱歉，处理超时。已调用工具 10 次，但未能完成回答。");
    }
}

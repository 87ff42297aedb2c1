//! 材料工具的类型化定义与 JSON Schema 生成（schemars）
//!
//! 模型输出的 `{"tool": "...", "args": {...}}` 先解析为 ToolCall，再经 TryFrom 转为封闭枚举 MaterialTool；
//! 工具声明（名称、描述、参数 Schema）拼入 tutor 的 system prompt。

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::react::planner::ToolCall;

/// 检索参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchArgs {
    /// 搜索查询，可以是关键词、短语或对所找内容的描述
    pub query: String,
    /// 返回结果数量，默认为 3
    #[serde(default, deserialize_with = "optional_number_or_string")]
    #[schemars(with = "Option<usize>")]
    pub top_k: Option<usize>,
}

/// 页码参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PageArgs {
    /// 页码
    #[serde(deserialize_with = "number_or_string")]
    #[schemars(with = "u32")]
    pub page_num: u32,
}

/// 文本块参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChunkArgs {
    /// 文本块 ID
    #[serde(deserialize_with = "number_or_string")]
    #[schemars(with = "usize")]
    pub chunk_id: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Num(T),
    Str(String),
}

impl<T> NumberOrString<T>
where
    T: FromStr,
    T::Err: Display,
{
    fn into_number<E: serde::de::Error>(self) -> Result<T, E> {
        match self {
            Self::Num(n) => Ok(n),
            Self::Str(s) => s.trim().parse().map_err(E::custom),
        }
    }
}

/// 模型有时把数字写成字符串（"3"），两种都接受
fn number_or_string<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    NumberOrString::<T>::deserialize(deserializer)?.into_number()
}

/// 可选版本：null 视为未提供
fn optional_number_or_string<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    Option::<NumberOrString<T>>::deserialize(deserializer)?
        .map(NumberOrString::into_number)
        .transpose()
}

/// 材料工具：封闭枚举，分发时穷尽匹配
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialTool {
    KeywordSearch(SearchArgs),
    SemanticSearch(SearchArgs),
    GetPageContent(PageArgs),
    GetChunkById(ChunkArgs),
}

impl MaterialTool {
    pub const KEYWORD_SEARCH: &'static str = "keyword_search";
    pub const SEMANTIC_SEARCH: &'static str = "semantic_search";
    pub const GET_PAGE_CONTENT: &'static str = "get_page_content";
    pub const GET_CHUNK_BY_ID: &'static str = "get_chunk_by_id";

    pub fn name(&self) -> &'static str {
        match self {
            Self::KeywordSearch(_) => Self::KEYWORD_SEARCH,
            Self::SemanticSearch(_) => Self::SEMANTIC_SEARCH,
            Self::GetPageContent(_) => Self::GET_PAGE_CONTENT,
            Self::GetChunkById(_) => Self::GET_CHUNK_BY_ID,
        }
    }
}

/// 工具调用无法转为 MaterialTool
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolDispatchError {
    #[error("未知工具: {0}")]
    UnknownTool(String),

    #[error("工具参数错误 ({tool}): {detail}")]
    InvalidArguments { tool: String, detail: String },
}

fn parse_args<T: for<'de> Deserialize<'de>>(call: &ToolCall) -> Result<T, ToolDispatchError> {
    // 模型省略 args 时按空对象处理
    let args = if call.args.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        call.args.clone()
    };
    serde_json::from_value(args).map_err(|e| ToolDispatchError::InvalidArguments {
        tool: call.tool.clone(),
        detail: e.to_string(),
    })
}

impl TryFrom<&ToolCall> for MaterialTool {
    type Error = ToolDispatchError;

    fn try_from(call: &ToolCall) -> Result<Self, Self::Error> {
        match call.tool.as_str() {
            Self::KEYWORD_SEARCH => Ok(Self::KeywordSearch(parse_args(call)?)),
            Self::SEMANTIC_SEARCH => Ok(Self::SemanticSearch(parse_args(call)?)),
            Self::GET_PAGE_CONTENT => Ok(Self::GetPageContent(parse_args(call)?)),
            Self::GET_CHUNK_BY_ID => Ok(Self::GetChunkById(parse_args(call)?)),
            other => Err(ToolDispatchError::UnknownTool(other.to_string())),
        }
    }
}

/// 工具声明：名称、描述、参数 JSON Schema
#[derive(Debug, Clone, Serialize)]
pub struct ToolDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: serde_json::Value,
}

fn schema_value<T: JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schema_for!(T)).unwrap_or(serde_json::Value::Null)
}

/// 四个材料工具的声明
pub fn material_tool_declarations() -> Vec<ToolDeclaration> {
    vec![
        ToolDeclaration {
            name: MaterialTool::KEYWORD_SEARCH,
            description: "在材料中进行关键词搜索。适用于查找包含特定术语或概念的内容。",
            parameters: schema_value::<SearchArgs>(),
        },
        ToolDeclaration {
            name: MaterialTool::SEMANTIC_SEARCH,
            description: "在材料中进行语义搜索。适用于查找与问题语义相关的内容，即使不包含完全相同的关键词。",
            parameters: schema_value::<SearchArgs>(),
        },
        ToolDeclaration {
            name: MaterialTool::GET_PAGE_CONTENT,
            description: "获取材料中指定页面的完整内容。当你知道信息在哪一页时使用。",
            parameters: schema_value::<PageArgs>(),
        },
        ToolDeclaration {
            name: MaterialTool::GET_CHUNK_BY_ID,
            description: "根据块 ID 获取文本块的完整内容。当搜索结果中有你感兴趣的块时使用。",
            parameters: schema_value::<ChunkArgs>(),
        },
    ]
}

/// 声明列表的 JSON 字符串，可拼入 system prompt
pub fn declarations_json() -> String {
    serde_json::to_string_pretty(&material_tool_declarations()).unwrap_or_default()
}

/// 工具调用请求格式：与 parse_llm_output 解析的 `{"tool": "...", "args": {...}}` 一致（仅用于 Schema 生成）
#[allow(dead_code)]
#[derive(JsonSchema)]
struct ToolCallFormat {
    /// 工具名，如 keyword_search、get_page_content
    pub tool: String,
    /// 工具参数，依工具不同而不同（query、top_k、page_num、chunk_id）
    pub args: HashMap<String, serde_json::Value>,
}

/// 返回工具调用的 JSON Schema 字符串，可拼入 system prompt
pub fn tool_call_schema_json() -> String {
    let schema = schema_for!(ToolCallFormat);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| String::new())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn call(tool: &str, args: serde_json::Value) -> ToolCall {
        ToolCall {
            tool: tool.to_string(),
            args,
        }
    }

    #[test]
    fn test_known_tools_convert() {
        let t = MaterialTool::try_from(&call("keyword_search", json!({"query": "dual"}))).unwrap();
        assert_eq!(
            t,
            MaterialTool::KeywordSearch(SearchArgs {
                query: "dual".into(),
                top_k: None
            })
        );

        let t = MaterialTool::try_from(&call("semantic_search", json!({"query": "dual", "top_k": "5"})))
            .unwrap();
        assert_eq!(
            t,
            MaterialTool::SemanticSearch(SearchArgs {
                query: "dual".into(),
                top_k: Some(5)
            })
        );

        let t = MaterialTool::try_from(&call("keyword_search", json!({"query": "dual", "top_k": null})))
            .unwrap();
        assert_eq!(t, MaterialTool::KeywordSearch(SearchArgs { query: "dual".into(), top_k: None }));

        let err = MaterialTool::try_from(&call("keyword_search", json!({"query": "dual", "top_k": "five"})))
            .unwrap_err();
        assert!(matches!(err, ToolDispatchError::InvalidArguments { .. }));

        let t = MaterialTool::try_from(&call("get_page_content", json!({"page_num": "12"}))).unwrap();
        assert_eq!(t, MaterialTool::GetPageContent(PageArgs { page_num: 12 }));

        let t = MaterialTool::try_from(&call("get_chunk_by_id", json!({"chunk_id": 4}))).unwrap();
        assert_eq!(t.name(), "get_chunk_by_id");
    }

    #[test]
    fn test_unknown_tool_and_bad_args() {
        let err = MaterialTool::try_from(&call("generate_diagram", json!({}))).unwrap_err();
        assert_eq!(err.to_string(), "未知工具: generate_diagram");

        let err = MaterialTool::try_from(&call("semantic_search", json!({"top_k": 2}))).unwrap_err();
        assert!(matches!(err, ToolDispatchError::InvalidArguments { .. }));
        assert!(err.to_string().starts_with("工具参数错误 (semantic_search): "));

        let err = MaterialTool::try_from(&call("get_page_content", serde_json::Value::Null)).unwrap_err();
        assert!(matches!(err, ToolDispatchError::InvalidArguments { .. }));
    }

    #[test]
    fn test_declarations_have_schemas() {
        let decls = material_tool_declarations();
        let names: Vec<&str> = decls.iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec!["keyword_search", "semantic_search", "get_page_content", "get_chunk_by_id"]
        );
        let json = declarations_json();
        assert!(json.contains("\"query\""));
        assert!(json.contains("\"page_num\""));
        assert!(tool_call_schema_json().contains("\"tool\""));
    }
}

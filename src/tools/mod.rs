//! 工具层：材料检索工具的定义与分发、生成代码的进程执行

pub mod dispatcher;
pub mod runner;
pub mod schema;

pub use dispatcher::{format_search_results, ToolDispatcher};
pub use runner::{CodeRunner, ExecError, ExecutionOutcome, ProcessRunner};
pub use schema::{
    declarations_json, material_tool_declarations, tool_call_schema_json, MaterialTool,
    ToolDeclaration, ToolDispatchError,
};

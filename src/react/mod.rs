//! 认知层：Planner（模型调用与输出解析）、提示词、tutor 工具调用循环、solver 生成/执行/反思流程

pub mod planner;
pub mod prompts;
pub mod solver;
pub mod tutor;

pub use planner::{
    extract_code_block, is_intermediate_reasoning, parse_llm_output, Planner, PlannerOutput,
    ToolCall,
};

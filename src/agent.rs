//! Headless Agent 运行时
//!
//! 供 CLI 或其他前端调用的无界面入口：run_tutor 回答一个问题，run_solver 求解一个优化问题，
//! 均返回调用方可见的结果，完整状态仍可通过 Orchestrator::run 获得。

use std::path::PathBuf;

use crate::core::{ConversationState, Orchestrator};

/// 求解结果：最终文本、最后一版代码、解题步骤与反思次数
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutcome {
    pub solution: String,
    pub code: String,
    pub steps: Vec<String>,
    pub reflections: u32,
}

/// 基于材料回答问题；返回最终回答（或超时/错误说明）
pub async fn run_tutor(orc: &Orchestrator, question: &str, materials: Vec<PathBuf>) -> String {
    let state = orc.run(ConversationState::tutor(question, materials)).await;
    state.result.unwrap_or_default()
}

/// 求解优化问题
pub async fn run_solver(orc: &Orchestrator, problem: &str) -> SolverOutcome {
    let state = orc.run(ConversationState::solver(problem)).await;
    SolverOutcome {
        solution: state.result.unwrap_or_default(),
        code: state.code,
        steps: state.solution_steps,
        reflections: state.reflection_count,
    }
}

//! Solver 流程：生成解答与代码 → 执行 → 失败时反思修复并重试（次数有上限）
//!
//! 每个函数对应编排器的一个阶段，返回下一阶段。

use crate::core::{AgentError, ConversationState, Orchestrator, Phase};
use crate::llm::CompletionOptions;
use crate::memory::Message;
use crate::react::planner::extract_code_block;
use crate::react::prompts::{
    reflection_request, solver_request, DEFAULT_CODE_EXECUTOR_PROMPT, DEFAULT_SOLVER_PROMPT,
};

/// SolverLoop：让模型分析问题并给出代码
pub async fn generate_solution(orc: &Orchestrator, state: &mut ConversationState) -> Phase {
    let profile = &orc.agents.solver;
    let options = CompletionOptions::new(profile.model.clone(), profile.temperature);
    let request = Message::user(solver_request(&state.question));

    let text = match orc
        .planner
        .plan_with_system(profile.prompt_or(DEFAULT_SOLVER_PROMPT), std::slice::from_ref(&request), &options)
        .await
    {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Error in solver: {}", e);
            state.result = Some(format!("Error: {}", e));
            return Phase::Done;
        }
    };

    let code = extract_code_block(&text);
    state.messages.push(request);
    state.messages.push(Message::assistant(text.clone()));
    state.solution_steps = vec![text.clone()];
    state.code = code.clone().unwrap_or_default();

    match code {
        Some(_) => {
            tracing::info!("solution generated, executing code");
            Phase::ExecuteCode
        }
        None => {
            tracing::info!("solution has no code block, returning it as is");
            state.result = Some(text);
            Phase::Done
        }
    }
}

/// ExecuteCode：运行当前代码；非 0 退出进入反思，超时/无法启动直接结束（除非配置了 reflect_on_timeout）
pub async fn execute_code(orc: &Orchestrator, state: &mut ConversationState) -> Phase {
    match orc.runner.run(&state.code).await {
        Ok(outcome) if outcome.success() => {
            tracing::info!("code executed successfully");
            let narrative = state.solution_steps.first().map(String::as_str).unwrap_or("");
            state.result = Some(format!(
                "{}\n\n## Execution Result\n```\n{}\n```",
                narrative, outcome.stdout
            ));
            Phase::Done
        }
        Ok(outcome) => {
            let stderr = if outcome.stderr.trim().is_empty() {
                format!("Process exited with code {:?}", outcome.exit_code)
            } else {
                outcome.stderr
            };
            let err = AgentError::CodeExecutionFailed {
                exit_code: outcome.exit_code,
                stderr: stderr.clone(),
            };
            tracing::warn!("{}", err);
            reflect_or_give_up(orc, state, stderr)
        }
        Err(e) => {
            let err = AgentError::from(e);
            tracing::error!("Error executing code: {}", err);
            if orc.solver.reflect_on_timeout {
                reflect_or_give_up(orc, state, err.to_string())
            } else {
                state.result = Some(format!("Execution error: {}", err));
                Phase::Done
            }
        }
    }
}

fn reflect_or_give_up(orc: &Orchestrator, state: &mut ConversationState, error: String) -> Phase {
    let max = orc.solver.max_reflections;
    if state.reflection_count < max {
        state.reflection_count += 1;
        tracing::info!(attempt = state.reflection_count, max, "reflecting on execution error");
        Phase::ReflectAndFix { error }
    } else {
        let err = AgentError::ReflectionExhausted {
            attempts: max,
            last_error: error,
        };
        tracing::error!("{}", err);
        state.result = Some(err.to_string());
        Phase::Done
    }
}

/// ReflectAndFix：把失败代码与错误交给 code_executor 角色，取回修正后的代码
pub async fn reflect_and_fix(orc: &Orchestrator, state: &mut ConversationState, error: &str) -> Phase {
    let profile = &orc.agents.code_executor;
    let options = CompletionOptions::new(profile.model.clone(), profile.temperature);
    let request = Message::user(reflection_request(&state.code, error));

    let text = match orc
        .planner
        .plan_with_system(
            profile.prompt_or(DEFAULT_CODE_EXECUTOR_PROMPT),
            std::slice::from_ref(&request),
            &options,
        )
        .await
    {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Error in reflection: {}", e);
            state.result = Some(format!("Reflection error: {}", e));
            return Phase::Done;
        }
    };

    state.messages.push(request);
    state.messages.push(Message::assistant(text.clone()));

    match extract_code_block(&text) {
        Some(code) => {
            tracing::info!("code fixed, retrying execution");
            state.code = code;
            Phase::ExecuteCode
        }
        None => {
            state.result = Some(format!("Failed to fix code: {}", error));
            Phase::Done
        }
    }
}

//! Tutor 循环：加载材料后与模型多轮交互，模型可反复调用材料工具，直到给出最终回答或轮数用尽
//!
//! 每轮：工具调用 → 分发并以函数响应回注；格式错误的工具调用 → 追加纠正提示；
//! 带中间思考标记的文本（且仍有余量）→ 追加「继续」提示；其余文本即最终回答。

use crate::core::{ConversationState, Orchestrator};
use crate::llm::CompletionOptions;
use crate::memory::Message;
use crate::react::planner::{is_intermediate_reasoning, parse_llm_output, PlannerOutput};
use crate::react::prompts::{
    format_correction, material_line, timeout_message, tutor_instruction, tutor_question,
    CONTINUE_NUDGE, DEFAULT_TUTOR_PROMPT, NO_RESPONSE,
};

/// 运行 tutor 循环，结果写入 state.result，对话写入 state.messages
pub async fn run_tutor_loop(orc: &Orchestrator, state: &mut ConversationState) {
    let mut lines = Vec::new();
    {
        let mut store = orc.store.lock().await;
        for path in &state.materials {
            match store.load(path, false).await {
                Ok(summary) => {
                    tracing::info!(file = %summary.file_name, cached = summary.cached, "material ready");
                    lines.push(material_line(&summary));
                }
                Err(e) => tracing::warn!("Failed to load {}: {}", path.display(), e),
            }
        }
    }
    state.context = lines.join("\n");

    let profile = &orc.agents.tutor;
    let system = tutor_instruction(profile.prompt_or(DEFAULT_TUTOR_PROMPT), &lines);
    let options = CompletionOptions::new(profile.model.clone(), profile.temperature);
    let max_iterations = orc.tutor.max_iterations;
    let max_exploratory = orc.tutor.max_exploratory_tool_calls;

    let mut messages = vec![Message::user(tutor_question(&state.question))];
    let mut tool_calls = 0usize;
    let mut result: Option<String> = None;

    for iteration in 1..=max_iterations {
        tracing::debug!(iteration, max_iterations, tool_calls, "tutor iteration");

        let reply = match orc.planner.plan_with_system(&system, &messages, &options).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Error in tutor loop: {}", e);
                result = Some(format!("Error: {}", e));
                break;
            }
        };
        if reply.trim().is_empty() {
            tracing::warn!("No more actions from model");
            result = Some(NO_RESPONSE.to_string());
            break;
        }

        match parse_llm_output(&reply) {
            Ok(PlannerOutput::ToolCall(call)) => {
                tool_calls += 1;
                tracing::info!(tool = %call.tool, call = tool_calls, "tutor tool call");
                let output = {
                    let store = orc.store.lock().await;
                    orc.dispatcher.dispatch(&call, &store).await
                };
                messages.push(Message::assistant(reply.trim()));
                messages.push(Message::function_response(&call.tool, &output));
            }
            Err(e) => {
                tracing::warn!("Malformed tool call: {}", e);
                messages.push(Message::assistant(reply.trim()));
                messages.push(Message::user(format_correction(&e.to_string())));
            }
            Ok(PlannerOutput::Response(text)) => {
                let has_budget = tool_calls < max_exploratory
                    && iteration < max_iterations.saturating_sub(1);
                if has_budget && is_intermediate_reasoning(&text) {
                    tracing::debug!("model is thinking aloud, nudging it to continue");
                    messages.push(Message::assistant(text));
                    messages.push(Message::user(CONTINUE_NUDGE));
                    continue;
                }
                tracing::info!(tool_calls, "tutor answer ready");
                messages.push(Message::assistant(text.clone()));
                result = Some(text);
                break;
            }
        }
    }

    if result.is_none() {
        tracing::warn!(tool_calls, "max iterations reached");
    }
    state.result = Some(result.unwrap_or_else(|| timeout_message(tool_calls)));
    state.messages = messages;
}

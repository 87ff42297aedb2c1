//! Agent 编排器：有限状态机主控
//!
//! Init → RouteByMode → TutorLoop | SolverLoop → Done，求解分支为 SolverLoop → ExecuteCode ⇄ ReflectAndFix。
//! 各阶段只修改传入的 ConversationState；任何错误都落成 result 文本，不会逃出 run。

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::{AgentsSection, SolverSection, TutorSection};
use crate::core::{AgentMode, ConversationState};
use crate::materials::MaterialStore;
use crate::react::{solver, tutor, Planner};
use crate::tools::{CodeRunner, ToolDispatcher};

/// 编排阶段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Init,
    RouteByMode,
    TutorLoop,
    SolverLoop,
    ExecuteCode,
    /// 携带上一次执行的错误输出
    ReflectAndFix { error: String },
    Done,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::RouteByMode => "route_by_mode",
            Phase::TutorLoop => "tutor_loop",
            Phase::SolverLoop => "solver_loop",
            Phase::ExecuteCode => "execute_code",
            Phase::ReflectAndFix { .. } => "reflect_and_fix",
            Phase::Done => "done",
        }
    }
}

/// 编排器：持有模型、材料库、工具分发器与代码执行器；可在多次运行间共享
pub struct Orchestrator {
    pub(crate) planner: Planner,
    pub(crate) store: Arc<Mutex<MaterialStore>>,
    pub(crate) dispatcher: ToolDispatcher,
    pub(crate) runner: Arc<dyn CodeRunner>,
    pub(crate) agents: AgentsSection,
    pub(crate) tutor: TutorSection,
    pub(crate) solver: SolverSection,
}

impl Orchestrator {
    pub fn new(
        planner: Planner,
        store: Arc<Mutex<MaterialStore>>,
        runner: Arc<dyn CodeRunner>,
        agents: AgentsSection,
        tutor: TutorSection,
        solver: SolverSection,
    ) -> Self {
        Self {
            planner,
            store,
            dispatcher: ToolDispatcher::new(tutor.default_top_k),
            runner,
            agents,
            tutor,
            solver,
        }
    }

    /// 共享的材料库
    pub fn store(&self) -> Arc<Mutex<MaterialStore>> {
        self.store.clone()
    }

    /// 累计 token 使用：(prompt, completion, total)
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.planner.token_usage()
    }

    /// 驱动状态机直到 Done，返回最终状态
    pub async fn run(&self, mut state: ConversationState) -> ConversationState {
        let mut phase = Phase::Init;
        loop {
            let next = match &phase {
                Phase::Init => {
                    state.messages.clear();
                    state.reflection_count = 0;
                    Phase::RouteByMode
                }
                Phase::RouteByMode => match state.mode {
                    AgentMode::Tutor => Phase::TutorLoop,
                    AgentMode::Solver => Phase::SolverLoop,
                    AgentMode::Unknown => {
                        tracing::warn!("unknown mode, nothing to do");
                        Phase::Done
                    }
                },
                Phase::TutorLoop => {
                    tutor::run_tutor_loop(self, &mut state).await;
                    Phase::Done
                }
                Phase::SolverLoop => solver::generate_solution(self, &mut state).await,
                Phase::ExecuteCode => solver::execute_code(self, &mut state).await,
                Phase::ReflectAndFix { error } => solver::reflect_and_fix(self, &mut state, error).await,
                Phase::Done => break,
            };
            tracing::debug!(from = phase.name(), to = next.name(), "phase transition");
            phase = next;
        }
        state
    }
}

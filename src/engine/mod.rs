//! 编排引擎：规划 → 执行 → 摘要 → 流式合成
//!
//! Session Orchestrator 驱动单轮状态机；跨轮记忆只有 SessionState 的待澄清槽位。

pub mod events;
pub mod formatter;
pub mod orchestrator;
pub mod plan;
pub mod planner;
pub mod responder;
pub mod runner;
pub mod session;

pub use events::AgentEvent;
pub use formatter::format_results;
pub use orchestrator::{Engine, EngineOptions};
pub use plan::{parse_plan_output, PlanResult, PlanStep};
pub use planner::Planner;
pub use responder::Responder;
pub use runner::run_plan;
pub use session::{looks_like_answer, merge_followup, PendingClarification, SessionState};

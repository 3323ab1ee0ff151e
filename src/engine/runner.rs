//! Plan Runner：顺序执行计划步骤
//!
//! 严格按序、不重试、不并行（后续步骤可能依赖前面步骤的副作用，且摘要顺序要可预期）。
//! 每步产出一个结果，失败不打断后续步骤；成败裁决归编排器，这里不做策略。

use chrono::NaiveDate;

use crate::engine::plan::PlanStep;
use crate::tools::{ExecutionResult, ToolExecutor};

/// 执行全部步骤，返回与步骤同序的结果列表
pub async fn run_plan(
    executor: &ToolExecutor,
    steps: &[PlanStep],
    today: NaiveDate,
) -> Vec<ExecutionResult> {
    let mut results = Vec::with_capacity(steps.len());
    for step in steps {
        results.push(executor.execute(step, today).await);
    }
    results
}

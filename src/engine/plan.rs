//! 计划的数据形状与解析
//!
//! LLM 规划输出在此边界立即校验成 PlanResult 标签联合，其他组件只见类型化的值；
//! 解析失败是 error 变体的唯一来源。parse_plan_output 容忍 ```json 围栏与前后杂质。

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::core::AgentError;

/// 一个计划步骤：工具名 + 参数 + 用途说明（参数在执行时才校验）
#[derive(Debug, Clone, Deserialize)]
pub struct PlanStep {
    pub tool: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub purpose: String,
}

/// 规划结果：恰好一个变体生效，调用方必须穷尽匹配
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanResult {
    NeedsClarification {
        question: String,
    },
    Conversation {
        response: String,
    },
    Ready {
        #[serde(default)]
        plan: Vec<PlanStep>,
        #[serde(default)]
        response_hint: String,
    },
    Error {
        message: String,
    },
}

/// 从 LLM 原始输出中提取 JSON 并解析为 PlanResult
pub fn parse_plan_output(output: &str) -> Result<PlanResult, AgentError> {
    let trimmed = output.trim();

    // 提取 JSON 块（```json ... ``` 或首个 { 到末个 }）
    let json_str = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        rest.find("```")
            .map(|end| rest[..end].trim())
            .unwrap_or_else(|| rest.trim())
    } else if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        &trimmed[start..=end]
    } else {
        return Err(AgentError::JsonParse(format!(
            "no JSON object in output: {}",
            trimmed
        )));
    };

    serde_json::from_str(json_str).map_err(|e| AgentError::JsonParse(format!("{}: {}", e, json_str)))
}

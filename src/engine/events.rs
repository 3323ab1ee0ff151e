//! 面向调用方的过程事件流
//!
//! 每轮的事件序列：零或多个 status，然后恰好一组终态
//! （question + done，或若干 text + done）；done 永远是最后一个。

use serde::Serialize;

/// 单条过程事件（可序列化为 {"type": …, "content": …} 供前端展示）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum AgentEvent {
    /// 进度叙述
    Status(String),
    /// 需要用户回答的澄清问题（本轮随即结束）
    Question(String),
    /// 回复文本的一个片段（流式输出）
    Text(String),
    /// 本轮结束
    Done,
}

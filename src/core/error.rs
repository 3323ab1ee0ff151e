//! Agent 错误类型
//!
//! 协作方（Google API / LLM）的故障在各自边界转为 AgentError；
//! 工具执行层再把它降级为普通的失败结果，不向上抛异常。

use thiserror::Error;

/// Agent 运行过程中可能出现的错误（未连接、网络、解析、LLM）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Google account not connected")]
    NotConnected,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("LLM error: {0}")]
    Llm(String),
}

//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / DeepSeek / Mock）实现 LlmClient：
//! complete（非流式）、complete_json（规划模式：temperature 0 + 严格 JSON 输出）、
//! complete_stream（流式 Token，用于最终回复合成）。

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::llm::Message;

/// 流式完成返回的 Token 流
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, String>> + Send>>;

/// LLM 客户端 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成
    async fn complete(&self, messages: &[Message]) -> Result<String, String>;

    /// 规划模式：要求确定性（temperature 0）且仅输出 JSON 对象。
    /// 默认退化为 complete，具体实现可覆盖为 response_format=json_object。
    async fn complete_json(&self, messages: &[Message]) -> Result<String, String> {
        self.complete(messages).await
    }

    /// 流式完成，返回 Token 流
    async fn complete_stream(&self, messages: &[Message]) -> Result<TokenStream, String>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}

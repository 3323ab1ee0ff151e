//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按入队顺序吐出预设回复；队列为空时回显最后一条 User 消息。
//! complete_stream 将回复切成小段模拟增量输出。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::stream;

use crate::llm::{LlmClient, Message, Role, TokenStream};

/// 流式输出时每段字符数
const CHUNK_CHARS: usize = 8;

/// Mock 客户端：预设回复队列，空则回显；记录每次调用的 user 内容供断言
#[derive(Debug, Default)]
pub struct MockLlmClient {
    responses: Mutex<VecDeque<String>>,
    user_prompts: Mutex<Vec<String>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预设一组按序返回的回复
    pub fn with_responses(responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            user_prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn push_response(&self, response: impl Into<String>) {
        self.responses.lock().unwrap().push_back(response.into());
    }

    /// 每次调用收到的最后一条 user 消息内容（按调用顺序）
    pub fn user_prompts(&self) -> Vec<String> {
        self.user_prompts.lock().unwrap().clone()
    }

    fn next_response(&self, messages: &[Message]) -> String {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");
        self.user_prompts.lock().unwrap().push(last_user.to_string());

        if let Some(r) = self.responses.lock().unwrap().pop_front() {
            return r;
        }
        format!("Echo from Mock: {}", last_user)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        Ok(self.next_response(messages))
    }

    async fn complete_stream(&self, messages: &[Message]) -> Result<TokenStream, String> {
        let content = self.next_response(messages);
        let chunks: Vec<Result<String, String>> = content
            .chars()
            .collect::<Vec<_>>()
            .chunks(CHUNK_CHARS)
            .map(|c| Ok(c.iter().collect()))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}

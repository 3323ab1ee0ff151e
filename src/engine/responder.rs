//! Response Synthesizer：合成最终回复（流式）
//!
//! 把用户原始请求 + 执行摘要 + 可选提示交给 LLM 的流式接口，
//! 返回的 Token 流由编排器逐片转发为 text 事件，不做缓冲。

use std::sync::Arc;

use crate::llm::{LlmClient, Message, TokenStream};

const RESPONSE_SYSTEM_PROMPT: &str = r#"You are a helpful assistant. Given the user's request and the data retrieved, provide a clear and concise response.

FORMATTING RULES:
- Use markdown formatting
- Format dates as: Mon Feb 10 (not "February 10th, 2026")
- Use bullet points for lists
- Be concise - under 200 words unless more detail is needed
- No fluff like "I hope this helps"

FOR CALENDAR EVENTS:
📅 **Event Title**
• When: Day, Date at Time
• Location: (if available)

FOR EMAILS:
📧 **Subject**
• From: Sender
• Date: Day, Date
• Summary: Brief content summary"#;

/// 回复合成器
pub struct Responder {
    llm: Arc<dyn LlmClient>,
}

impl Responder {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// 发起一次流式合成；流是一次性的，消费即转发
    pub async fn respond(
        &self,
        prompt: &str,
        digest: &str,
        hint: &str,
    ) -> Result<TokenStream, String> {
        let hint_line = if hint.is_empty() {
            String::new()
        } else {
            format!("Hint: {}\n\n", hint)
        };
        let user_message = format!(
            "User's request: {}\n\n\
             Results from actions:\n{}\n\n\
             {}Provide a helpful response to the user based on these results.",
            prompt, digest, hint_line
        );

        let messages = [
            Message::system(RESPONSE_SYSTEM_PROMPT),
            Message::user(user_message),
        ];
        self.llm.complete_stream(&messages).await
    }
}

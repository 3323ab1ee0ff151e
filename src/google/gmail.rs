//! Gmail 客户端：搜索与发送
//!
//! 搜索先取消息 id 列表，再逐条取 format=full 解析；正文从 MIME 部件中提取：
//! 优先 text/plain，嵌套 multipart 递归，text/html 经 html2text 转纯文本，最后回退 snippet。
//! 发送按 RFC822 拼装并 base64url 编码为 raw。

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use serde_json::{json, Value};

use crate::core::AgentError;
use crate::google::{EmailMessage, GoogleAuth, MailService};

const GMAIL_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
/// 正文最大保留字符数，超出截断（控制摘要与 LLM 输入体积）
const MAX_BODY_CHARS: usize = 4000;

/// base64url 解码（容忍缺失的填充）
fn decode_b64url(data: &str) -> Option<String> {
    let mut s = data.trim().to_string();
    while s.len() % 4 != 0 {
        s.push('=');
    }
    let bytes = URL_SAFE.decode(s.as_bytes()).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// 从 payload 递归提取正文文本
fn extract_body(payload: &Value) -> String {
    let body = payload
        .pointer("/body/data")
        .and_then(Value::as_str)
        .and_then(decode_b64url)
        .unwrap_or_default();

    let parts = match payload.get("parts").and_then(Value::as_array) {
        Some(parts) => parts,
        None => return body,
    };

    for part in parts {
        let mime = part.get("mimeType").and_then(Value::as_str).unwrap_or("");

        if mime == "text/plain" {
            if let Some(text) = part
                .pointer("/body/data")
                .and_then(Value::as_str)
                .and_then(decode_b64url)
            {
                if !text.trim().is_empty() {
                    return text;
                }
            }
        }

        if mime.starts_with("multipart/") || part.get("parts").is_some() {
            let nested = extract_body(part);
            if !nested.trim().is_empty() {
                return nested;
            }
        }
    }

    // 没有 text/plain 时回退 text/html
    for part in parts {
        if part.get("mimeType").and_then(Value::as_str) == Some("text/html") {
            if let Some(html) = part
                .pointer("/body/data")
                .and_then(Value::as_str)
                .and_then(decode_b64url)
            {
                if let Ok(text) = html2text::from_read(html.as_bytes(), 120) {
                    let text = text.trim().to_string();
                    if !text.is_empty() {
                        return text;
                    }
                }
            }
        }
    }

    body
}

/// 把一条 format=full 的消息转成 EmailMessage
fn parse_message(msg: &Value) -> EmailMessage {
    let mut subject = String::new();
    let mut from = String::new();
    let mut date = String::new();
    if let Some(headers) = msg.pointer("/payload/headers").and_then(Value::as_array) {
        for h in headers {
            let name = h.get("name").and_then(Value::as_str).unwrap_or("");
            let value = h.get("value").and_then(Value::as_str).unwrap_or("");
            match name {
                "Subject" => subject = value.to_string(),
                "From" => from = value.to_string(),
                "Date" => date = value.to_string(),
                _ => {}
            }
        }
    }

    let snippet = msg
        .get("snippet")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let mut body = msg
        .get("payload")
        .map(extract_body)
        .unwrap_or_default();
    if body.trim().is_empty() {
        body = snippet.clone();
    }
    if body.chars().count() > MAX_BODY_CHARS {
        body = body.chars().take(MAX_BODY_CHARS).collect();
    }

    EmailMessage {
        id: msg
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        subject,
        from,
        date,
        snippet,
        body,
    }
}

/// Gmail 客户端
pub struct GmailClient {
    auth: Arc<GoogleAuth>,
}

impl GmailClient {
    pub fn new(auth: Arc<GoogleAuth>) -> Self {
        Self { auth }
    }

    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<EmailMessage>, AgentError> {
        let list = self
            .auth
            .get_json(
                &format!("{}/messages", GMAIL_BASE_URL),
                &[
                    ("q", query.to_string()),
                    ("maxResults", max_results.to_string()),
                ],
            )
            .await?;

        let ids: Vec<String> = list
            .get("messages")
            .and_then(Value::as_array)
            .map(|msgs| {
                msgs.iter()
                    .take(max_results as usize)
                    .filter_map(|m| m.get("id").and_then(Value::as_str))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let mut emails = Vec::with_capacity(ids.len());
        for id in ids {
            let msg = self
                .auth
                .get_json(
                    &format!("{}/messages/{}", GMAIL_BASE_URL, id),
                    &[("format", "full".to_string())],
                )
                .await?;
            emails.push(parse_message(&msg));
        }
        Ok(emails)
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AgentError> {
        let message = format!(
            "To: {}\r\nSubject: {}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}",
            to, subject, body
        );
        let raw = URL_SAFE.encode(message.as_bytes());

        let (status, _) = self
            .auth
            .post_json(&format!("{}/messages/send", GMAIL_BASE_URL), &json!({ "raw": raw }))
            .await?;
        if !status.is_success() {
            return Err(AgentError::Http(format!("HTTP {}", status)));
        }
        Ok(())
    }
}

#[async_trait]
impl MailService for GmailClient {
    async fn search_messages(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<EmailMessage>, String> {
        self.search(query, max_results).await.map_err(|e| e.to_string())
    }

    async fn send_message(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        self.send(to, subject, body).await.map_err(|e| e.to_string())
    }
}

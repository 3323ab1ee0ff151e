//! 会话状态：单槽位的待澄清上下文
//!
//! 每个会话（调用方持有）一个槽位：提出澄清问题时存入原始请求与问题，
//! 下一轮开始做合并判定后无条件清空。短输入或含邮箱地址的输入视为对问题的回答，
//! 与原始请求拼接成复合提示词重新规划。

use crate::tools::is_valid_address;

/// 待澄清上下文：原始请求 + 已提出的问题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClarification {
    pub original_prompt: String,
    pub question_asked: String,
}

/// 会话状态（按会话一份，由调用方传入每一轮）
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pending: Option<PendingClarification>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pending(&mut self, original_prompt: impl Into<String>, question: impl Into<String>) {
        self.pending = Some(PendingClarification {
            original_prompt: original_prompt.into(),
            question_asked: question.into(),
        });
    }

    /// 取出并清空槽位（合并判定前调用，保证槽位单轮有效）
    pub fn take_pending(&mut self) -> Option<PendingClarification> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// 新输入是否像对澄清问题的回答：含合法邮箱地址，或足够短
pub fn looks_like_answer(utterance: &str, max_words: usize) -> bool {
    let words: Vec<&str> = utterance.split_whitespace().collect();
    words.iter().any(|w| is_valid_address(w)) || words.len() <= max_words
}

/// 把回答拼回原始请求，形成复合提示词
pub fn merge_followup(pending: &PendingClarification, answer: &str) -> String {
    format!(
        "{}\n\n(User was asked: '{}' and answered: '{}')",
        pending.original_prompt, pending.question_asked, answer
    )
}

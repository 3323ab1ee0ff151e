//! 单步执行结果封装
//!
//! 每个计划步骤恰好产出一个 ExecutionResult；失败也只是值，绝不向上抛。
//! Failed.clarification 允许单个工具在执行中途否决计划并向用户追问（如收件人地址无法解析）。

use crate::google::{CalendarEvent, EmailMessage};

/// 按结果种类区分的载荷
#[derive(Debug, Clone)]
pub enum StepOutcome {
    Emails(Vec<EmailMessage>),
    Events(Vec<CalendarEvent>),
    EventCreated {
        title: String,
        date: String,
        start_time: String,
        id: String,
    },
    EmailSent {
        to: String,
    },
    Failed {
        error: String,
        clarification: Option<String>,
    },
}

/// 单步结果：来源步骤的 purpose + 载荷
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub purpose: String,
    pub outcome: StepOutcome,
}

impl ExecutionResult {
    pub fn success(purpose: impl Into<String>, outcome: StepOutcome) -> Self {
        Self {
            purpose: purpose.into(),
            outcome,
        }
    }

    pub fn failure(purpose: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            purpose: purpose.into(),
            outcome: StepOutcome::Failed {
                error: error.into(),
                clarification: None,
            },
        }
    }

    /// 失败并携带追问（执行中途请求澄清）
    pub fn needs_clarification(
        purpose: impl Into<String>,
        error: impl Into<String>,
        question: impl Into<String>,
    ) -> Self {
        Self {
            purpose: purpose.into(),
            outcome: StepOutcome::Failed {
                error: error.into(),
                clarification: Some(question.into()),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, StepOutcome::Failed { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            StepOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn clarification(&self) -> Option<&str> {
        match &self.outcome {
            StepOutcome::Failed {
                clarification: Some(q),
                ..
            } => Some(q),
            _ => None,
        }
    }

    /// 结果种类标签（审计日志用）
    pub fn kind(&self) -> &'static str {
        match &self.outcome {
            StepOutcome::Emails(_) => "emails",
            StepOutcome::Events(_) => "events",
            StepOutcome::EventCreated { .. } => "event_created",
            StepOutcome::EmailSent { .. } => "email_sent",
            StepOutcome::Failed { .. } => "error",
        }
    }
}

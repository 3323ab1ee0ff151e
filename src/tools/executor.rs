//! 工具执行器
//!
//! 对单个计划步骤做名称分发与参数校验，调用邮件/日历协作方，把成败统一包成 ExecutionResult；
//! 协作方的任何故障都被捕获为失败结果，绝不向上抛。每次调用输出结构化审计日志（JSON）。
//!
//! send_email 在调用协作方之前对收件人地址做二次权威校验（不信任 Planner 已查过），
//! 不合法时返回携带追问的失败，让编排器在执行中途转入澄清而非裸报错。

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Instant;

use chrono::NaiveDate;
use regex::Regex;

use crate::engine::plan::PlanStep;
use crate::google::{CalendarEvent, CalendarService, MailService};
use crate::tools::{EventRange, ExecutionResult, StepOutcome, ToolAction};

/// 收件人地址的严格模式：local@domain.tld（TLD 至少两个字母）
pub fn is_valid_address(address: &str) -> bool {
    static ADDRESS_RE: OnceLock<Regex> = OnceLock::new();
    let re = ADDRESS_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[A-Za-z]{2,}$").expect("address pattern is valid")
    });
    re.is_match(address)
}

/// 过滤词按大小写不敏感的整词匹配命中 title+description+location
fn matches_filter(event: &CalendarEvent, filter: &str) -> bool {
    let haystack = format!("{} {} {}", event.title, event.description, event.location);
    match Regex::new(&format!(r"(?i)\b{}\b", regex::escape(filter))) {
        Ok(re) => re.is_match(&haystack),
        // 过滤词构造不出合法模式时退化为包含匹配
        Err(_) => haystack.to_lowercase().contains(&filter.to_lowercase()),
    }
}

/// 工具执行器：持有邮件与日历协作方
pub struct ToolExecutor {
    mail: Arc<dyn MailService>,
    calendar: Arc<dyn CalendarService>,
}

impl ToolExecutor {
    pub fn new(mail: Arc<dyn MailService>, calendar: Arc<dyn CalendarService>) -> Self {
        Self { mail, calendar }
    }

    /// 执行一个计划步骤；today 为范围解析的参考日
    pub async fn execute(&self, step: &PlanStep, today: NaiveDate) -> ExecutionResult {
        let start = Instant::now();
        let result = self.dispatch(step, today).await;

        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": step.tool,
            "ok": result.is_success(),
            "outcome": result.kind(),
            "duration_ms": start.elapsed().as_millis() as u64,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        result
    }

    async fn dispatch(&self, step: &PlanStep, today: NaiveDate) -> ExecutionResult {
        let purpose = step.purpose.as_str();
        let action = match ToolAction::from_call(&step.tool, &step.params) {
            Ok(action) => action,
            Err(e) => return ExecutionResult::failure(purpose, e),
        };

        match action {
            ToolAction::SearchEmails { query, max_results } => {
                match self.mail.search_messages(&query, max_results).await {
                    Ok(emails) => ExecutionResult::success(purpose, StepOutcome::Emails(emails)),
                    Err(e) => ExecutionResult::failure(purpose, e),
                }
            }

            ToolAction::ListCalendarEvents { range, filter } => {
                self.list_events(purpose, range, filter, today).await
            }

            ToolAction::CreateCalendarEvent {
                title,
                date,
                start_time,
                end_time,
                location,
                description,
            } => {
                let start_dt = format!("{}T{}:00", date, start_time);
                let end_dt = format!("{}T{}:00", date, end_time);
                match self
                    .calendar
                    .create_event(&title, &start_dt, &end_dt, &description, &location)
                    .await
                {
                    Ok(id) => ExecutionResult::success(
                        purpose,
                        StepOutcome::EventCreated {
                            title,
                            date,
                            start_time,
                            id,
                        },
                    ),
                    Err(e) => ExecutionResult::failure(purpose, e),
                }
            }

            ToolAction::SendEmail { to, subject, body } => {
                if !is_valid_address(&to) {
                    let question = if to.is_empty() {
                        "Who should receive this email? Please give me their email address."
                            .to_string()
                    } else {
                        format!(
                            "I don't have an email address for '{}'. What address should I send it to?",
                            to
                        )
                    };
                    return ExecutionResult::needs_clarification(
                        purpose,
                        format!("Invalid recipient address: '{}'", to),
                        question,
                    );
                }
                match self.mail.send_message(&to, &subject, &body).await {
                    Ok(()) => ExecutionResult::success(purpose, StepOutcome::EmailSent { to }),
                    Err(e) => ExecutionResult::failure(purpose, e),
                }
            }

            ToolAction::ReplyEmail => ExecutionResult::failure(
                purpose,
                "Replying within an email thread is not available; compose a new email with send_email instead.",
            ),
        }
    }

    async fn list_events(
        &self,
        purpose: &str,
        range: EventRange,
        filter: Option<String>,
        today: NaiveDate,
    ) -> ExecutionResult {
        let (start, end) = range.window(today);
        let mut events = match self.calendar.list_events(start, end).await {
            Ok(events) => events,
            Err(e) => return ExecutionResult::failure(purpose, e),
        };

        // 两次收窄相互独立：先按精确日，再按关键词
        if let Some(day) = range.exact_day(today) {
            events.retain(|e| e.start_date() == Some(day));
        }
        if let Some(filter) = filter {
            events.retain(|e| matches_filter(e, &filter));
        }

        ExecutionResult::success(purpose, StepOutcome::Events(events))
    }
}

//! Session Orchestrator：单轮状态机
//!
//! 一轮的走向：连通性门禁 → 合并待澄清上下文 → 规划 →
//! {澄清 | 寒暄 | 执行计划 → 摘要 → 流式合成 | 失败}，事件流以 done 收尾。
//! 任何内部失败都以完整事件序列结束，调用方永远不会等在半空。
//!
//! 跨轮记忆只有 SessionState 里的待澄清槽位；规划澄清与执行中途澄清
//! 两条路径都会回填槽位，下一轮的短回答能拼回原始请求。

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use futures_util::StreamExt;

use crate::engine::events::AgentEvent;
use crate::engine::formatter::format_results;
use crate::engine::plan::PlanResult;
use crate::engine::planner::Planner;
use crate::engine::responder::Responder;
use crate::engine::runner::run_plan;
use crate::engine::session::{looks_like_answer, merge_followup, SessionState};
use crate::google::{AccountStatus, CalendarService, MailService};
use crate::llm::LlmClient;
use crate::tools::{ToolExecutor, ToolRegistry};

const NOT_CONNECTED_ADVICE: &str =
    "⚠️ Please connect your Google account first, then ask me again.";
const EMPTY_PLAN_ADVICE: &str =
    "I understood your request but couldn't determine the right actions. Could you rephrase?";

/// 编排器可调参数
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// 追问回答判定的词数上限
    pub followup_max_words: usize,
    /// 摘要中邮件正文截断长度
    pub body_preview_chars: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            followup_max_words: 12,
            body_preview_chars: 500,
        }
    }
}

/// 编排引擎：跨轮复用，状态由调用方持有的 SessionState 承载
pub struct Engine {
    planner: Planner,
    executor: ToolExecutor,
    responder: Responder,
    account: Arc<dyn AccountStatus>,
    options: EngineOptions,
}

fn send(tx: &UnboundedSender<AgentEvent>, event: AgentEvent) {
    let _ = tx.send(event);
}

impl Engine {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        mail: Arc<dyn MailService>,
        calendar: Arc<dyn CalendarService>,
        account: Arc<dyn AccountStatus>,
        options: EngineOptions,
    ) -> Self {
        let registry = ToolRegistry::new();
        Self {
            planner: Planner::new(llm.clone(), &registry),
            executor: ToolExecutor::new(mail, calendar),
            responder: Responder::new(llm),
            account,
            options,
        }
    }

    /// 处理一轮用户输入，事件推入 tx；today 为日期解析的参考日
    pub async fn process(
        &self,
        state: &mut SessionState,
        utterance: &str,
        today: NaiveDate,
        tx: &UnboundedSender<AgentEvent>,
    ) {
        if !self.account.is_connected() {
            send(tx, AgentEvent::Text(NOT_CONNECTED_ADVICE.to_string()));
            send(tx, AgentEvent::Done);
            return;
        }

        // 合并判定后槽位无条件清空（take）
        let prompt = match state.take_pending() {
            Some(pending) if looks_like_answer(utterance, self.options.followup_max_words) => {
                tracing::debug!("merging follow-up answer into pending prompt");
                merge_followup(&pending, utterance)
            }
            _ => utterance.to_string(),
        };

        send(tx, AgentEvent::Status("Understanding your request...".to_string()));
        match self.planner.plan(&prompt, today).await {
            PlanResult::NeedsClarification { question } => {
                state.set_pending(prompt.clone(), question.clone());
                send(tx, AgentEvent::Question(question));
            }

            PlanResult::Conversation { response } => {
                send(tx, AgentEvent::Text(response));
            }

            PlanResult::Error { message } => {
                send(tx, AgentEvent::Text(format!("❌ Planning error: {}", message)));
            }

            PlanResult::Ready { plan, response_hint } => {
                if plan.is_empty() {
                    send(tx, AgentEvent::Text(EMPTY_PLAN_ADVICE.to_string()));
                    send(tx, AgentEvent::Done);
                    return;
                }

                for (i, step) in plan.iter().enumerate() {
                    let purpose = if step.purpose.is_empty() {
                        "Processing"
                    } else {
                        step.purpose.as_str()
                    };
                    send(tx, AgentEvent::Status(format!("Step {}: {}...", i + 1, purpose)));
                }
                send(tx, AgentEvent::Status("Executing plan...".to_string()));

                let results = run_plan(&self.executor, &plan, today).await;

                // 只报告序列中第一个失败；后续结果不外露
                if let Some(failed) = results.iter().find(|r| !r.is_success()) {
                    match failed.clarification() {
                        Some(question) => {
                            state.set_pending(prompt.clone(), question);
                            send(tx, AgentEvent::Question(question.to_string()));
                        }
                        None => {
                            let error = failed.error().unwrap_or("Unknown error");
                            send(tx, AgentEvent::Text(format!("❌ Error: {}", error)));
                        }
                    }
                    send(tx, AgentEvent::Done);
                    return;
                }

                send(tx, AgentEvent::Status("Generating response...".to_string()));
                let digest = format_results(&results, self.options.body_preview_chars);
                self.stream_response(&prompt, &digest, &response_hint, tx).await;
            }
        }
        send(tx, AgentEvent::Done);
    }

    /// 逐片转发合成流；流中途出错时以错误文本收场
    async fn stream_response(
        &self,
        prompt: &str,
        digest: &str,
        hint: &str,
        tx: &UnboundedSender<AgentEvent>,
    ) {
        let mut stream = match self.responder.respond(prompt, digest, hint).await {
            Ok(stream) => stream,
            Err(e) => {
                send(tx, AgentEvent::Text(format!("❌ Error generating response: {}", e)));
                return;
            }
        };

        while let Some(fragment) = stream.next().await {
            match fragment {
                Ok(text) => {
                    if !text.is_empty() {
                        send(tx, AgentEvent::Text(text));
                    }
                }
                Err(e) => {
                    send(tx, AgentEvent::Text(format!("❌ Error generating response: {}", e)));
                    return;
                }
            }
        }
    }
}

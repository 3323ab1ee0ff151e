//! Planner：把用户请求规划成工具步骤序列
//!
//! 以工具目录 + 参考日期 + 行为规则拼 system 提示词，走 LLM 的严格 JSON 规划模式，
//! 输出在边界解析为 PlanResult；解析不出预期形状时返回 Error("Failed to parse plan")。

use std::sync::Arc;

use chrono::{Days, NaiveDate};

use crate::engine::plan::{parse_plan_output, PlanResult};
use crate::llm::{LlmClient, Message};
use crate::tools::ToolRegistry;

const PLANNER_RULES: &str = r#"RESPOND WITH JSON ONLY. Choose one of these response types:

TYPE 1 - Need more information:
{
    "status": "needs_clarification",
    "question": "What time should I schedule the meeting?"
}

TYPE 2 - Ready to execute:
{
    "status": "ready",
    "plan": [
        {
            "tool": "tool_name",
            "params": {"param1": "value1"},
            "purpose": "Brief description of what this step does"
        }
    ],
    "response_hint": "Brief hint about how to summarize results to the user"
}

TYPE 3 - Just conversation (no tools needed):
{
    "status": "conversation",
    "response": "Your direct response to the user"
}

IMPORTANT RULES:
- Lookup questions ("when is X", "do I have X") ALWAYS become an immediate search_emails or list_calendar_events step. Never ask the user for a date they are trying to find out.
- A send_email step requires a real email address (user@domain.tld) already known from the user's message. If only a name was given, use needs_clarification to ask for the address. NEVER invent or guess an address.
- Never leave placeholder tokens like [name], [date] or [email] in generated subjects or bodies; omit what you do not know.
- One request may decompose into several sequential steps (e.g. create an event, then send an email about it).
- Resolve relative times ("tomorrow", "in 30 minutes", "next Monday") to absolute dates and times using TODAY'S DATE before putting them into params.
- If the user says "today at 3pm for 2 hours", calculate end_time as "17:00"."#;

/// Planner：持有 LLM 与渲染好的工具目录
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    tools_description: String,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>, registry: &ToolRegistry) -> Self {
        Self {
            llm,
            tools_description: registry.describe(),
        }
    }

    /// 同一 utterance + 同一参考日期在重放时产生同一提示词
    fn system_prompt(&self, today: NaiveDate) -> String {
        let tomorrow = today + Days::new(1);
        format!(
            "You are an assistant that helps users with email and calendar tasks.\n\
             \n\
             Your job is to:\n\
             1. Understand what the user wants to do\n\
             2. Determine if you have enough information to proceed\n\
             3. Create an action plan using available tools\n\
             \n\
             AVAILABLE TOOLS:\n{tools}\n\
             \n\
             TODAY'S DATE: {today} (tomorrow is {tomorrow})\n\
             \n\
             {rules}",
            tools = self.tools_description,
            today = today.format("%A, %B %d, %Y"),
            tomorrow = tomorrow.format("%Y-%m-%d"),
            rules = PLANNER_RULES,
        )
    }

    /// 规划一次；所有失败折叠为 PlanResult::Error，调用方穷尽匹配即可
    pub async fn plan(&self, utterance: &str, today: NaiveDate) -> PlanResult {
        let messages = [
            Message::system(self.system_prompt(today)),
            Message::user(utterance),
        ];

        let raw = match self.llm.complete_json(&messages).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "planner LLM call failed");
                return PlanResult::Error { message: e };
            }
        };

        match parse_plan_output(&raw) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "plan output did not match expected shape");
                PlanResult::Error {
                    message: "Failed to parse plan".to_string(),
                }
            }
        }
    }
}

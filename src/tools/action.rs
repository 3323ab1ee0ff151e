//! 计划步骤到类型化工具调用的转换
//!
//! LLM 产出的步骤以字符串命名工具、JSON 装参数；这里一次性转为封闭的 ToolAction 枚举，
//! 后续执行全部走穷尽匹配。未知工具名在此处拒绝（"Unknown tool: …"），不会深入执行层。

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

/// 日历取数的符号范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRange {
    Today,
    Tomorrow,
    Week,
    Month,
}

impl EventRange {
    /// 解析符号范围；未知值回退 week
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "today" => EventRange::Today,
            "tomorrow" => EventRange::Tomorrow,
            "month" => EventRange::Month,
            _ => EventRange::Week,
        }
    }

    /// 相对参考日解析为具体窗口 [start, end)
    pub fn window(self, today: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let (from, days) = match self {
            EventRange::Today => (today, 1),
            EventRange::Tomorrow => (today + Days::new(1), 1),
            EventRange::Week => (today, 7),
            EventRange::Month => (today, 30),
        };
        let start = from.and_time(chrono::NaiveTime::MIN);
        let end = (from + Days::new(days)).and_time(chrono::NaiveTime::MIN);
        (start, end)
    }

    /// today/tomorrow 需要按精确日再过滤一次（原始窗口可能取到跨日事件）
    pub fn exact_day(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            EventRange::Today => Some(today),
            EventRange::Tomorrow => Some(today + Days::new(1)),
            EventRange::Week | EventRange::Month => None,
        }
    }
}

/// 类型化工具调用（封闭集合）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolAction {
    SearchEmails {
        query: String,
        max_results: u32,
    },
    ListCalendarEvents {
        range: EventRange,
        filter: Option<String>,
    },
    CreateCalendarEvent {
        title: String,
        date: String,
        start_time: String,
        end_time: String,
        location: String,
        description: String,
    },
    SendEmail {
        to: String,
        subject: String,
        body: String,
    },
    /// 线程内回复：不支持，执行层固定报错
    ReplyEmail,
}

fn str_param(params: &Map<String, Value>, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn required_str(params: &Map<String, Value>, tool: &str, key: &str) -> Result<String, String> {
    str_param(params, key)
        .ok_or_else(|| format!("Missing required parameter '{}' for {}", key, tool))
}

fn int_param(params: &Map<String, Value>, key: &str, default: u32) -> u32 {
    params
        .get(key)
        .and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        })
        .map(|n| n as u32)
        .unwrap_or(default)
}

impl ToolAction {
    /// 从 (工具名, 参数表) 转换；参数在此做惰性校验
    pub fn from_call(tool: &str, params: &Map<String, Value>) -> Result<Self, String> {
        match tool {
            "search_emails" => Ok(ToolAction::SearchEmails {
                query: str_param(params, "query").unwrap_or_default(),
                max_results: int_param(params, "max_results", 5),
            }),
            "list_calendar_events" => Ok(ToolAction::ListCalendarEvents {
                range: EventRange::parse(
                    &str_param(params, "range").unwrap_or_else(|| "week".to_string()),
                ),
                filter: str_param(params, "filter"),
            }),
            "create_calendar_event" => Ok(ToolAction::CreateCalendarEvent {
                title: required_str(params, tool, "title")?,
                date: required_str(params, tool, "date")?,
                start_time: required_str(params, tool, "start_time")?,
                end_time: required_str(params, tool, "end_time")?,
                location: str_param(params, "location").unwrap_or_default(),
                description: str_param(params, "description").unwrap_or_default(),
            }),
            "send_email" => Ok(ToolAction::SendEmail {
                // 留空走执行层的地址校验，会转成澄清问题而非硬错误
                to: str_param(params, "to").unwrap_or_default(),
                subject: str_param(params, "subject").unwrap_or_default(),
                body: str_param(params, "body").unwrap_or_default(),
            }),
            "reply_email" => Ok(ToolAction::ReplyEmail),
            other => Err(format!("Unknown tool: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn search_defaults_max_results() {
        let action =
            ToolAction::from_call("search_emails", &params(json!({"query": "from:amy"}))).unwrap();
        assert_eq!(
            action,
            ToolAction::SearchEmails {
                query: "from:amy".to_string(),
                max_results: 5
            }
        );
    }

    #[test]
    fn list_parses_range_and_filter() {
        let action = ToolAction::from_call(
            "list_calendar_events",
            &params(json!({"range": "Today", "filter": "dentist"})),
        )
        .unwrap();
        assert_eq!(
            action,
            ToolAction::ListCalendarEvents {
                range: EventRange::Today,
                filter: Some("dentist".to_string())
            }
        );
    }

    #[test]
    fn unknown_range_falls_back_to_week() {
        assert_eq!(EventRange::parse("fortnight"), EventRange::Week);
    }

    #[test]
    fn create_requires_all_time_fields() {
        let err = ToolAction::from_call(
            "create_calendar_event",
            &params(json!({"title": "Dentist", "date": "2026-08-08", "start_time": "15:00"})),
        )
        .unwrap_err();
        assert_eq!(
            err,
            "Missing required parameter 'end_time' for create_calendar_event"
        );
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let err = ToolAction::from_call("summon_pigeon", &Map::new()).unwrap_err();
        assert_eq!(err, "Unknown tool: summon_pigeon");
    }

    #[test]
    fn windows_are_half_open_day_ranges() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let (start, end) = EventRange::Today.window(d);
        assert_eq!(start.date(), d);
        assert_eq!(end.date(), d + Days::new(1));

        let (start, end) = EventRange::Tomorrow.window(d);
        assert_eq!(start.date(), d + Days::new(1));
        assert_eq!(end.date(), d + Days::new(2));

        let (_, end) = EventRange::Month.window(d);
        assert_eq!(end.date(), d + Days::new(30));
    }

    #[test]
    fn exact_day_only_for_single_day_ranges() {
        let d = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(EventRange::Today.exact_day(d), Some(d));
        assert_eq!(EventRange::Tomorrow.exact_day(d), Some(d + Days::new(1)));
        assert_eq!(EventRange::Week.exact_day(d), None);
    }
}

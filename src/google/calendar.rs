//! Calendar 客户端：窗口取数与创建事件
//!
//! 取数按 [timeMin, timeMax) 窗口（singleEvents 展开、按开始时间排序），
//! 字段裁剪为引擎需要的形状；创建事件以返回的 id 判定成败。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::{json, Value};

use crate::core::AgentError;
use crate::google::{CalendarEvent, CalendarService, GoogleAuth};

const CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
/// 描述字段保留长度（字符）
const MAX_DESCRIPTION_CHARS: usize = 300;

fn to_rfc3339_utc(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn parse_event(event: &Value) -> CalendarEvent {
    let time_of = |key: &str| -> String {
        event
            .pointer(&format!("/{}/dateTime", key))
            .or_else(|| event.pointer(&format!("/{}/date", key)))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    };

    let mut description = event
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        description = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
    }

    CalendarEvent {
        id: event
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        title: event
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or("No title")
            .to_string(),
        start: time_of("start"),
        end: time_of("end"),
        location: event
            .get("location")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        description,
    }
}

/// Calendar 客户端
pub struct CalendarClient {
    auth: Arc<GoogleAuth>,
    timezone: String,
    max_results: u32,
}

impl CalendarClient {
    pub fn new(auth: Arc<GoogleAuth>, timezone: impl Into<String>, max_results: u32) -> Self {
        Self {
            auth,
            timezone: timezone.into(),
            max_results,
        }
    }

    async fn list(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CalendarEvent>, AgentError> {
        let data = self
            .auth
            .get_json(
                &format!("{}/calendars/primary/events", CALENDAR_BASE_URL),
                &[
                    ("timeMin", to_rfc3339_utc(start)),
                    ("timeMax", to_rfc3339_utc(end)),
                    ("singleEvents", "true".to_string()),
                    ("orderBy", "startTime".to_string()),
                    ("maxResults", self.max_results.to_string()),
                ],
            )
            .await?;

        Ok(data
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(parse_event).collect())
            .unwrap_or_default())
    }

    async fn create(
        &self,
        title: &str,
        start: &str,
        end: &str,
        description: &str,
        location: &str,
    ) -> Result<String, String> {
        let event = json!({
            "summary": title,
            "start": {"dateTime": start, "timeZone": self.timezone},
            "end": {"dateTime": end, "timeZone": self.timezone},
            "description": description,
            "location": location,
        });

        let (_, body) = self
            .auth
            .post_json(
                &format!("{}/calendars/primary/events", CALENDAR_BASE_URL),
                &event,
            )
            .await
            .map_err(|e| e.to_string())?;

        match body.get("id").and_then(Value::as_str) {
            Some(id) => Ok(id.to_string()),
            None => Err(body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string()),
        }
    }
}

#[async_trait]
impl CalendarService for CalendarClient {
    async fn list_events(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CalendarEvent>, String> {
        self.list(start, end).await.map_err(|e| e.to_string())
    }

    async fn create_event(
        &self,
        title: &str,
        start: &str,
        end: &str,
        description: &str,
        location: &str,
    ) -> Result<String, String> {
        self.create(title, start, end, description, location).await
    }
}

//! Google 协作方返回的数据形状（按编排引擎需要裁剪后的字段）

use serde::{Deserialize, Serialize};

/// 一封邮件（搜索结果）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailMessage {
    pub id: String,
    pub subject: String,
    pub from: String,
    pub date: String,
    pub snippet: String,
    pub body: String,
}

/// 一条日历事件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    /// RFC3339 时间戳或 YYYY-MM-DD 全天日期（与 API 返回一致）
    pub start: String,
    pub end: String,
    pub location: String,
    pub description: String,
}

impl CalendarEvent {
    /// 事件开始的日历日（取 start 前 10 位解析）
    pub fn start_date(&self) -> Option<chrono::NaiveDate> {
        let prefix = self.start.get(..10)?;
        chrono::NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_date_from_datetime_and_all_day() {
        let timed = CalendarEvent {
            start: "2026-08-07T15:00:00-07:00".to_string(),
            ..Default::default()
        };
        let all_day = CalendarEvent {
            start: "2026-08-08".to_string(),
            ..Default::default()
        };
        let bad = CalendarEvent {
            start: "soon".to_string(),
            ..Default::default()
        };
        assert_eq!(
            timed.start_date(),
            chrono::NaiveDate::from_ymd_opt(2026, 8, 7)
        );
        assert_eq!(
            all_day.start_date(),
            chrono::NaiveDate::from_ymd_opt(2026, 8, 8)
        );
        assert_eq!(bad.start_date(), None);
    }
}

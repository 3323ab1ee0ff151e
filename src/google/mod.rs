//! Google 协作方：账号状态、邮件与日历的窄接口
//!
//! 编排引擎只依赖这里的 trait（Arc<dyn …>），具体实现走 Gmail / Calendar REST API；
//! 测试用内存桩替换。所有故障以 Err(String) 返回，绝不 panic。

pub mod auth;
pub mod calendar;
pub mod gmail;
pub mod types;

use async_trait::async_trait;
use chrono::NaiveDateTime;

pub use auth::GoogleAuth;
pub use calendar::CalendarClient;
pub use gmail::GmailClient;
pub use types::{CalendarEvent, EmailMessage};

/// 账号连通性：未连接时编排器直接短路
pub trait AccountStatus: Send + Sync {
    fn is_connected(&self) -> bool;
}

/// 邮件服务：搜索与发送
#[async_trait]
pub trait MailService: Send + Sync {
    async fn search_messages(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<EmailMessage>, String>;

    /// 发送邮件；传输层失败必须返回 Err，由工具执行层转为失败结果
    async fn send_message(&self, to: &str, subject: &str, body: &str) -> Result<(), String>;
}

/// 日历服务：窗口取数与创建
#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn list_events(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<CalendarEvent>, String>;

    /// 创建事件；Ok 为新事件 id，Err 携带协作方的错误消息
    async fn create_event(
        &self,
        title: &str,
        start: &str,
        end: &str,
        description: &str,
        location: &str,
    ) -> Result<String, String>;
}

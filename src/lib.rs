//! Robin - Rust 邮件与日历智能助理
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型
//! - **engine**: 编排引擎（Planner、Plan Runner、Result Formatter、Response Synthesizer、会话状态机）
//! - **google**: Google 协作方（账号令牌、Gmail、Calendar）与窄接口 trait
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **tools**: 工具目录、类型化调用与执行器

pub mod config;
pub mod core;
pub mod engine;
pub mod google;
pub mod llm;
pub mod tools;

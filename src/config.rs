//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `ROBIN__*` 覆盖（双下划线表示嵌套，如 `ROBIN__LLM__PROVIDER=openai`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub google: GoogleSection,
    #[serde(default)]
    pub agent: AgentSection,
}

/// [app] 段：应用名
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [llm] 段：后端选择与超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：deepseek / openai；优先级由 API Key 与 provider 共同决定
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    #[serde(default)]
    pub deepseek: LlmDeepSeekSection,
    #[serde(default)]
    pub openai: LlmOpenAiSection,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            deepseek: LlmDeepSeekSection::default(),
            openai: LlmOpenAiSection::default(),
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmDeepSeekSection {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmOpenAiSection {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmTimeoutsSection {
    pub request: u64,
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

/// [google] 段：令牌文件、时区与取数上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GoogleSection {
    /// OAuth 令牌文件路径（由外部授权流程写入）
    pub tokens_file: PathBuf,
    /// 创建日历事件时使用的时区
    pub timezone: String,
    /// 单次日历窗口取数上限
    pub calendar_max_results: u32,
}

impl Default for GoogleSection {
    fn default() -> Self {
        Self {
            tokens_file: default_tokens_file(),
            timezone: default_timezone(),
            calendar_max_results: default_calendar_max_results(),
        }
    }
}

fn default_tokens_file() -> PathBuf {
    PathBuf::from("storage/tokens.json")
}

fn default_timezone() -> String {
    "America/Los_Angeles".to_string()
}

fn default_calendar_max_results() -> u32 {
    50
}

/// [agent] 段：追问合并与摘要长度
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// 追问回答判定的词数上限（短输入视为对澄清问题的回答）
    pub followup_max_words: usize,
    /// 摘要中邮件正文的截断长度（字符）
    pub body_preview_chars: usize,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            followup_max_words: default_followup_max_words(),
            body_preview_chars: default_body_preview_chars(),
        }
    }
}

fn default_followup_max_words() -> usize {
    12
}

fn default_body_preview_chars() -> usize {
    500
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            llm: LlmSection::default(),
            google: GoogleSection::default(),
            agent: AgentSection::default(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 ROBIN__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 ROBIN__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("ROBIN")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

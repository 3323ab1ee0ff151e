//! Robin - Rust 邮件与日历智能助理
//!
//! 入口：初始化日志与配置，装配 Google 协作方、LLM 与编排引擎，
//! 以简单的 stdin/stdout 对话循环消费事件流。

use std::io::Write as _;
use std::sync::Arc;

use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use robin::config::{load_config, AppConfig};
use robin::engine::{AgentEvent, Engine, EngineOptions, SessionState};
use robin::google::{
    AccountStatus, CalendarClient, CalendarService, GmailClient, GoogleAuth, MailService,
};
use robin::llm::{create_deepseek_client, LlmClient, MockLlmClient, OpenAiClient};

/// 根据配置与环境变量选择 LLM 后端（DeepSeek / OpenAI 兼容 / Mock）
fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let use_deepseek = std::env::var("DEEPSEEK_API_KEY").is_ok()
        || (provider == "deepseek" && std::env::var("OPENAI_API_KEY").is_ok());
    let use_openai = std::env::var("OPENAI_API_KEY").is_ok() && provider != "deepseek";

    if use_deepseek {
        let model = cfg
            .llm
            .deepseek
            .model
            .clone()
            .unwrap_or_else(|| cfg.llm.model.clone());
        tracing::info!("Using DeepSeek LLM ({})", model);
        Arc::new(create_deepseek_client(Some(&model)))
    } else if use_openai {
        let model = cfg
            .llm
            .openai
            .model
            .clone()
            .unwrap_or_else(|| cfg.llm.model.clone());
        tracing::info!("Using OpenAI LLM ({})", model);
        Arc::new(OpenAiClient::new(
            cfg.llm.base_url.as_deref(),
            &model,
            std::env::var("OPENAI_API_KEY").ok().as_deref(),
        ))
    } else {
        tracing::warn!("No API key set or provider unknown, using Mock LLM");
        Arc::new(MockLlmClient::new())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with(fmt::layer())
        .init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let auth = Arc::new(GoogleAuth::new(cfg.google.tokens_file.clone()));
    let mail: Arc<dyn MailService> = Arc::new(GmailClient::new(auth.clone()));
    let calendar: Arc<dyn CalendarService> = Arc::new(CalendarClient::new(
        auth.clone(),
        cfg.google.timezone.clone(),
        cfg.google.calendar_max_results,
    ));
    let account: Arc<dyn AccountStatus> = auth;
    let llm = create_llm_from_config(&cfg);

    let engine = Engine::new(
        llm,
        mail,
        calendar,
        account,
        EngineOptions {
            followup_max_words: cfg.agent.followup_max_words,
            body_preview_chars: cfg.agent.body_preview_chars,
        },
    );

    let name = cfg.app.name.as_deref().unwrap_or("robin");
    println!("{} ready. Ask about your mail or calendar (exit to quit).", name);

    let mut state = SessionState::new();
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("you> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim().to_string();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        let printer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    AgentEvent::Status(s) => eprintln!("· {}", s),
                    AgentEvent::Question(q) => println!("? {}", q),
                    AgentEvent::Text(t) => {
                        print!("{}", t);
                        let _ = std::io::stdout().flush();
                    }
                    AgentEvent::Done => println!(),
                }
            }
        });

        let today = chrono::Local::now().date_naive();
        engine.process(&mut state, &input, today, &tx).await;
        drop(tx);
        let _ = printer.await;
    }

    Ok(())
}

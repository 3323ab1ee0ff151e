//! Google OAuth 令牌存取与已授权请求
//!
//! 令牌文件由外部授权流程写入（浏览器 OAuth 不在本仓库范围）；
//! 这里负责读取、刷新（refresh_token 换 access_token）与带 Bearer 的 GET/POST。
//! 收到 401 时刷新一次并重试，仍失败则按普通 HTTP 错误返回。

use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::AgentError;
use crate::google::AccountStatus;

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// 令牌文件内容（其余字段忽略）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TokenSet {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

fn load_tokens(path: &Path) -> TokenSet {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

/// Google 账号：令牌持有者与已授权 HTTP 入口
pub struct GoogleAuth {
    tokens_file: PathBuf,
    client_id: Option<String>,
    client_secret: Option<String>,
    tokens: RwLock<TokenSet>,
    http: Client,
}

impl GoogleAuth {
    /// 从令牌文件与 GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET 环境变量构建
    pub fn new(tokens_file: impl Into<PathBuf>) -> Self {
        let tokens_file = tokens_file.into();
        let tokens = load_tokens(&tokens_file);
        Self {
            tokens_file,
            client_id: std::env::var("GOOGLE_CLIENT_ID").ok(),
            client_secret: std::env::var("GOOGLE_CLIENT_SECRET").ok(),
            tokens: RwLock::new(tokens),
            http: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }

    fn save_tokens(&self, tokens: &TokenSet) {
        if let Some(parent) = self.tokens_file.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string(tokens) {
            if let Err(e) = std::fs::write(&self.tokens_file, json) {
                tracing::warn!(error = %e, "token file write failed");
            }
        }
    }

    /// 当前 access token；内存为空时重读令牌文件
    fn bearer_token(&self) -> Result<String, AgentError> {
        if let Some(t) = self.tokens.read().unwrap().access_token.clone() {
            return Ok(t);
        }
        let reloaded = load_tokens(&self.tokens_file);
        let token = reloaded.access_token.clone();
        *self.tokens.write().unwrap() = reloaded;
        token.ok_or(AgentError::NotConnected)
    }

    /// 用 refresh_token 换新的 access_token；成功时写回令牌文件
    pub async fn refresh_access_token(&self) -> Result<bool, AgentError> {
        let (refresh_token, client_id, client_secret) = {
            let tokens = self.tokens.read().unwrap();
            match (&tokens.refresh_token, &self.client_id, &self.client_secret) {
                (Some(r), Some(i), Some(s)) => (r.clone(), i.clone(), s.clone()),
                _ => return Ok(false),
            }
        };

        let params = [
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];
        let resp = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| AgentError::Http(e.to_string()))?;
        let body: Value = resp
            .json()
            .await
            .map_err(|e| AgentError::JsonParse(e.to_string()))?;

        match body.get("access_token").and_then(Value::as_str) {
            Some(access) => {
                let mut tokens = self.tokens.write().unwrap();
                tokens.access_token = Some(access.to_string());
                self.save_tokens(&tokens);
                tracing::info!("access token refreshed");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 已授权 GET，返回 JSON；401 时刷新令牌并重试一次
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Value, AgentError> {
        let mut refreshed = false;
        loop {
            let token = self.bearer_token()?;
            let resp = self
                .http
                .get(url)
                .bearer_auth(&token)
                .query(query)
                .send()
                .await
                .map_err(|e| AgentError::Http(e.to_string()))?;

            if resp.status() == StatusCode::UNAUTHORIZED && !refreshed {
                refreshed = true;
                if self.refresh_access_token().await? {
                    continue;
                }
            }
            if !resp.status().is_success() {
                return Err(AgentError::Http(format!("HTTP {}", resp.status())));
            }
            return resp
                .json()
                .await
                .map_err(|e| AgentError::JsonParse(e.to_string()));
        }
    }

    /// 已授权 POST（JSON body），返回 (status, JSON)；401 时刷新令牌并重试一次
    pub async fn post_json(
        &self,
        url: &str,
        body: &Value,
    ) -> Result<(StatusCode, Value), AgentError> {
        let mut refreshed = false;
        loop {
            let token = self.bearer_token()?;
            let resp = self
                .http
                .post(url)
                .bearer_auth(&token)
                .json(body)
                .send()
                .await
                .map_err(|e| AgentError::Http(e.to_string()))?;

            if resp.status() == StatusCode::UNAUTHORIZED && !refreshed {
                refreshed = true;
                if self.refresh_access_token().await? {
                    continue;
                }
            }
            let status = resp.status();
            let json = resp.json().await.unwrap_or(Value::Null);
            return Ok((status, json));
        }
    }
}

impl AccountStatus for GoogleAuth {
    fn is_connected(&self) -> bool {
        if self.tokens.read().unwrap().access_token.is_some() {
            return true;
        }
        // 令牌可能在进程启动后才由授权流程写入
        let reloaded = load_tokens(&self.tokens_file);
        let connected = reloaded.access_token.is_some();
        if connected {
            *self.tokens.write().unwrap() = reloaded;
        }
        connected
    }
}

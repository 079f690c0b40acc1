//! アクセストークン読み込み
//!
//! トークンの発行・更新は外部で行う。ここでは読み取るだけ。

use crate::error::{ReportError, Result};
use serde::Deserialize;
use std::path::Path;

pub const TOKEN_ENV: &str = "GOOGLE_ACCESS_TOKEN";

/// token.json の形式（google-auth の authorized user 形式 / OAuth レスポンス形式）
#[derive(Debug, Deserialize)]
struct TokenFile {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
}

/// 環境変数 → トークンファイルの順でアクセストークンを取得
pub fn load_access_token(token_file: &Path) -> Result<String> {
    resolve_access_token(std::env::var(TOKEN_ENV).ok(), token_file)
}

pub fn resolve_access_token(env_token: Option<String>, token_file: &Path) -> Result<String> {
    if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
        log::debug!("using access token from {}", TOKEN_ENV);
        return Ok(token.trim().to_string());
    }

    if !token_file.exists() {
        return Err(ReportError::MissingCredentials(token_file.display().to_string()));
    }

    let content = std::fs::read_to_string(token_file)?;
    let parsed: TokenFile = serde_json::from_str(&content)?;
    let usable = |t: Option<String>| {
        t.map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    };
    usable(parsed.token)
        .or_else(|| usable(parsed.access_token))
        .ok_or_else(|| ReportError::MissingCredentials(token_file.display().to_string()))
}

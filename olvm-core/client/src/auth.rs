//! 密码模式令牌交换
//!
//! `POST {engine}/sso/oauth/token`，表单参数:
//! `grant_type=password&scope=ovirt-app-api&username=...&password=...`

use std::fmt;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{OlvmError, Result};
use crate::models::TokenResponse;
use crate::session::TokenSource;

/// 引擎 API 的 OAuth scope
pub const OVIRT_SCOPE: &str = "ovirt-app-api";

/// 登录凭据
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// 用户名和密码都非空时才构成凭据
    pub fn from_parts(username: Option<&str>, password: Option<&str>) -> Option<Self> {
        match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some(Self::new(u, p)),
            _ => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"******")
            .finish()
    }
}

/// 密码模式令牌来源
pub struct PasswordGrant {
    http_client: Client,
    token_url: String,
    credentials: Option<Credentials>,
}

impl PasswordGrant {
    pub fn new(http_client: Client, token_url: String, credentials: Option<Credentials>) -> Self {
        Self {
            http_client,
            token_url,
            credentials,
        }
    }
}

#[async_trait]
impl TokenSource for PasswordGrant {
    async fn fetch_token(&self) -> Result<String> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            warn!("未配置 OLVM 凭据");
            OlvmError::ConfigError(
                "未配置 OLVM 凭据 (OLVM_USER / OLVM_PASSWORD)".to_string(),
            )
        })?;

        info!("OLVM 令牌交换: {}", credentials.username);
        debug!("令牌端点: {}", self.token_url);

        let params = [
            ("grant_type", "password"),
            ("scope", OVIRT_SCOPE),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .header(ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| OlvmError::HttpError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OlvmError::HttpError(e.to_string()))?;
        let parsed = serde_json::from_str::<TokenResponse>(&body).ok();

        if !status.is_success() {
            let reason = parsed
                .and_then(|r| r.error_description.or(r.error))
                .unwrap_or(body);
            return Err(OlvmError::AuthError(format!(
                "令牌交换被拒绝 [{}]: {}",
                status.as_u16(),
                reason
            )));
        }

        let parsed = parsed
            .ok_or_else(|| OlvmError::AuthError("令牌响应不是有效的 JSON".to_string()))?;

        match parsed.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(OlvmError::AuthError(
                "引擎未返回 access_token".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_from_parts() {
        assert!(Credentials::from_parts(Some("admin@internal"), Some("secret")).is_some());
        assert!(Credentials::from_parts(Some("admin@internal"), None).is_none());
        assert!(Credentials::from_parts(None, Some("secret")).is_none());
        assert!(Credentials::from_parts(Some(""), Some("secret")).is_none());
    }

    #[test]
    fn test_credentials_debug_masks_password() {
        let creds = Credentials::new("admin@internal", "secret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("admin@internal"));
        assert!(!debug.contains("secret"));
    }

    #[tokio::test]
    async fn test_missing_credentials_is_config_error() {
        let grant = PasswordGrant::new(
            Client::new(),
            "http://127.0.0.1:9/ovirt-engine/sso/oauth/token".to_string(),
            None,
        );
        let err = grant.fetch_token().await.unwrap_err();
        assert!(matches!(err, OlvmError::ConfigError(_)));
    }
}

//! OLVM 客户端核心实现

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::{ClusterApi, HostApi, VmApi};
use crate::auth::{Credentials, PasswordGrant};
use crate::error::{OlvmError, Result};
use crate::session::{TokenSession, TokenSource};

/// 默认引擎路径前缀
pub const DEFAULT_ENGINE_PATH: &str = "/ovirt-engine";

/// OLVM 客户端配置
#[derive(Debug, Clone)]
pub struct OlvmConfig {
    /// 引擎路径前缀
    pub engine_path: String,

    /// 连接超时（秒）
    pub connect_timeout: u64,

    /// 请求超时（秒）
    pub request_timeout: u64,

    /// 是否验证 SSL 证书
    pub verify_ssl: bool,
}

impl Default for OlvmConfig {
    fn default() -> Self {
        Self {
            engine_path: DEFAULT_ENGINE_PATH.to_string(),
            connect_timeout: 10,
            request_timeout: 30,
            verify_ssl: false,
        }
    }
}

/// OLVM 引擎客户端
///
/// 所有资源查询共享同一个 [`TokenSession`]，并发查询只会触发一次令牌交换。
pub struct OlvmClient {
    /// API 根地址，如 `https://engine/ovirt-engine/api`
    api_root: String,

    /// HTTP 客户端
    http_client: Client,

    /// 令牌会话
    session: TokenSession,
}

impl OlvmClient {
    /// 创建使用密码模式认证的客户端
    ///
    /// 凭据缺失不会在此报错，首次令牌交换时才返回配置错误。
    pub fn new(base_url: &str, config: OlvmConfig, credentials: Option<Credentials>) -> Result<Self> {
        let http_client = build_http_client(&config)?;
        let engine_root = engine_root(base_url, &config.engine_path)?;

        let grant = PasswordGrant::new(
            http_client.clone(),
            format!("{}/sso/oauth/token", engine_root),
            credentials,
        );

        Ok(Self {
            api_root: format!("{}/api", engine_root),
            http_client,
            session: TokenSession::new(Arc::new(grant)),
        })
    }

    /// 创建使用自定义令牌来源的客户端
    pub fn with_token_source(
        base_url: &str,
        config: OlvmConfig,
        source: Arc<dyn TokenSource>,
    ) -> Result<Self> {
        let http_client = build_http_client(&config)?;
        let engine_root = engine_root(base_url, &config.engine_path)?;

        Ok(Self {
            api_root: format!("{}/api", engine_root),
            http_client,
            session: TokenSession::new(source),
        })
    }

    /// 获取虚拟机 API
    pub fn vms(&self) -> VmApi<'_> {
        VmApi::new(self)
    }

    /// 获取集群 API
    pub fn clusters(&self) -> ClusterApi<'_> {
        ClusterApi::new(self)
    }

    /// 获取主机 API
    pub fn hosts(&self) -> HostApi<'_> {
        HostApi::new(self)
    }

    /// 令牌会话
    pub fn session(&self) -> &TokenSession {
        &self.session
    }

    /// API 根地址
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// 发送带认证的 GET 请求
    ///
    /// 收到 401 时清除失效令牌，重新交换后重试一次。
    pub(crate) async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let token = self.session.ensure_token().await?;

        match self.send_get(path, &token).await {
            Err(e) if e.is_unauthorized() => {
                warn!("请求 {} 返回 401，重新认证后重试", path);
                self.session.invalidate_if(&token);
                let token = self.session.ensure_token().await?;
                self.send_get(path, &token).await
            }
            other => other,
        }
    }

    async fn send_get<R: DeserializeOwned>(&self, path: &str, token: &str) -> Result<R> {
        let url = format!("{}{}", self.api_root, path);
        debug!("OLVM API 请求: GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| OlvmError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "无法读取错误响应".to_string());
            warn!("API 请求失败: {} - {}", status, error_text);
            return Err(OlvmError::ApiError(status.as_u16(), error_text));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| OlvmError::ParseError(e.to_string()))
    }
}

fn build_http_client(config: &OlvmConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout))
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        .danger_accept_invalid_certs(!config.verify_ssl)
        .build()
        .map_err(|e| OlvmError::HttpError(e.to_string()))
}

/// 拼接引擎根地址，`base_url` 必须是合法的 http(s) 地址
fn engine_root(base_url: &str, engine_path: &str) -> Result<String> {
    let parsed = url::Url::parse(base_url)
        .map_err(|e| OlvmError::ConfigError(format!("无效的引擎地址 {}: {}", base_url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(OlvmError::ConfigError(format!(
            "引擎地址必须使用 http/https: {}",
            base_url
        )));
    }

    let path = engine_path.trim_matches('/');
    let base = base_url.trim_end_matches('/');
    if path.is_empty() {
        Ok(base.to_string())
    } else {
        Ok(format!("{}/{}", base, path))
    }
}

//! CLI 配置管理
//!
//! 支持从多个源加载配置:
//! - 环境变量 (优先级最高)
//! - 配置文件 (TOML/YAML)
//! - 默认值 (优先级最低)
//!
//! 配置文件搜索路径 (按优先级):
//! 1. `--config` 参数或 `OLVM_CONFIG` 环境变量指定的路径
//! 2. `./olvm.toml` / `./olvm.yaml` (当前目录)
//! 3. `~/.config/olvm/config.toml` (用户配置目录)

use anyhow::{Context, Result};
use olvm_client::{Credentials, OlvmConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// CLI 配置 (顶层)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 引擎连接配置
    #[serde(default)]
    pub olvm: EngineConfig,

    /// 视图配置
    #[serde(default)]
    pub view: ViewConfig,
}

/// 引擎连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 引擎地址，如 `https://olvm-mgr.home.lab`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 引擎路径前缀
    #[serde(default = "default_engine_path")]
    pub engine_path: String,

    /// 用户名，如 `admin@internal`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// 密码
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,

    /// 连接超时 (秒)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// 请求超时 (秒)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

/// 视图配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// 数据中心显示名称
    #[serde(default = "default_datacenter")]
    pub datacenter: String,

    /// 查询缓存有效期 (秒)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,
}

// ============================================
// 默认值函数
// ============================================

fn default_base_url() -> String {
    "https://olvm-mgr.home.lab".to_string()
}
fn default_engine_path() -> String {
    olvm_client::DEFAULT_ENGINE_PATH.to_string()
}
fn default_verify_ssl() -> bool {
    false
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_request_timeout() -> u64 {
    30
}
fn default_datacenter() -> String {
    "home.lab".to_string()
}
fn default_cache_ttl() -> u64 {
    30
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            engine_path: default_engine_path(),
            username: None,
            password: None,
            verify_ssl: default_verify_ssl(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            datacenter: default_datacenter(),
            cache_ttl: default_cache_ttl(),
        }
    }
}

// ============================================
// 配置加载实现
// ============================================

impl AppConfig {
    /// 从多个源加载配置 (优先级: 环境变量 > 配置文件 > 默认值)
    pub fn load(explicit_path: Option<&str>) -> Result<Self> {
        let path = match explicit_path {
            Some(p) => Some(PathBuf::from(p)),
            None => Self::find_config_file(),
        };

        let mut config = match path {
            Some(path) => {
                tracing::debug!("加载配置文件: {:?}", path);
                Self::load_from_file(&path)?
            }
            None => {
                tracing::debug!("未找到配置文件，使用默认值");
                Self::default()
            }
        };

        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// 从指定文件加载配置
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("解析 YAML 配置失败: {:?}", path)),
            _ => toml::from_str(&content)
                .with_context(|| format!("解析 TOML 配置失败: {:?}", path)),
        }
    }

    /// 查找配置文件 (按优先级搜索)
    fn find_config_file() -> Option<PathBuf> {
        if let Ok(path) = env::var("OLVM_CONFIG") {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }

        let mut paths = vec![PathBuf::from("./olvm.toml"), PathBuf::from("./olvm.yaml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config/olvm/config.toml"));
        }

        paths.into_iter().find(|p| p.exists())
    }

    /// 用环境变量覆盖配置，`lookup` 按变量名取值
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("OLVM_BASE_URL") {
            self.olvm.base_url = url;
        }
        if let Some(user) = lookup("OLVM_USER") {
            self.olvm.username = Some(user);
        }
        if let Some(password) = lookup("OLVM_PASSWORD") {
            self.olvm.password = Some(password);
        }
        if let Some(verify) = lookup("OLVM_VERIFY_SSL") {
            self.olvm.verify_ssl = matches!(verify.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(datacenter) = lookup("OLVM_DATACENTER") {
            self.view.datacenter = datacenter;
        }
    }

    /// 客户端连接配置
    pub fn client_config(&self) -> OlvmConfig {
        OlvmConfig {
            engine_path: self.olvm.engine_path.clone(),
            connect_timeout: self.olvm.connect_timeout,
            request_timeout: self.olvm.request_timeout,
            verify_ssl: self.olvm.verify_ssl,
        }
    }

    /// 登录凭据，用户名或密码缺失时为 None
    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::from_parts(self.olvm.username.as_deref(), self.olvm.password.as_deref())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.view.cache_ttl)
    }

    /// 隐藏密码后的副本，用于展示
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        if masked.olvm.password.is_some() {
            masked.olvm.password = Some("******".to_string());
        }
        masked
    }
}

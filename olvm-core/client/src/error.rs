//! OLVM 客户端错误定义

use thiserror::Error;

/// OLVM 客户端错误类型
///
/// 实现 `Clone`，同一次令牌交换的失败需要分发给所有并发等待者。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OlvmError {
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("认证错误: {0}")]
    AuthError(String),

    #[error("HTTP 错误: {0}")]
    HttpError(String),

    #[error("API 错误 [{0}]: {1}")]
    ApiError(u16, String),

    #[error("解析错误: {0}")]
    ParseError(String),
}

/// 错误大类，决定视图层如何呈现
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 凭据缺失等配置问题
    Configuration,
    /// 令牌交换被拒绝或响应不可用
    Authentication,
    /// 资源查询的网络/HTTP 失败
    Transport,
}

impl OlvmError {
    /// 错误所属大类
    pub fn kind(&self) -> ErrorKind {
        match self {
            OlvmError::ConfigError(_) => ErrorKind::Configuration,
            OlvmError::AuthError(_) => ErrorKind::Authentication,
            OlvmError::HttpError(_) | OlvmError::ApiError(_, _) | OlvmError::ParseError(_) => {
                ErrorKind::Transport
            }
        }
    }

    /// 是否为 401 未授权
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, OlvmError::ApiError(401, _))
    }
}

impl From<reqwest::Error> for OlvmError {
    fn from(e: reqwest::Error) -> Self {
        OlvmError::HttpError(e.to_string())
    }
}

/// OLVM 客户端结果类型
pub type Result<T> = std::result::Result<T, OlvmError>;

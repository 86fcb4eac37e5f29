//! OLVM 引擎客户端
//!
//! 提供与 oVirt / OLVM 引擎 REST API 交互的只读客户端实现。
//!
//! # 功能
//!
//! - **令牌会话** (`TokenSession`): 缓存访问令牌，合并并发的令牌交换
//! - **密码模式认证** (`PasswordGrant`): `/sso/oauth/token` 令牌交换
//! - **虚拟机查询** (`VmApi`)
//! - **集群查询** (`ClusterApi`)
//! - **主机查询** (`HostApi`)
//!
//! # 示例
//!
//! ```ignore
//! use olvm_client::{Credentials, OlvmClient, OlvmConfig};
//!
//! let client = OlvmClient::new(
//!     "https://olvm-mgr.home.lab",
//!     OlvmConfig::default(),
//!     Some(Credentials::new("admin@internal", "password")),
//! )?;
//!
//! // 三个查询并发发起，只会触发一次令牌交换
//! let (vms, clusters, hosts) = tokio::join!(
//!     client.vms().list(),
//!     client.clusters().list(),
//!     client.hosts().list(),
//! );
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod session;
pub mod source;

pub use auth::{Credentials, PasswordGrant, OVIRT_SCOPE};
pub use client::{OlvmClient, OlvmConfig, DEFAULT_ENGINE_PATH};
pub use error::{ErrorKind, OlvmError, Result};
pub use session::{TokenSession, TokenSource};
pub use source::InventorySource;

// 导出 API 模块
pub use api::{cluster::ClusterApi, host::HostApi, vm::VmApi};

// 导出数据模型
pub use models::{Cluster, Host, Vm};

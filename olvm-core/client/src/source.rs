//! 清单数据来源抽象

use async_trait::async_trait;

use crate::client::OlvmClient;
use crate::error::Result;
use crate::models::{Cluster, Host, Vm};

/// 清单数据来源
///
/// 三个查询彼此独立，可并发发起。
#[async_trait]
pub trait InventorySource: Send + Sync {
    async fn list_vms(&self) -> Result<Vec<Vm>>;
    async fn list_clusters(&self) -> Result<Vec<Cluster>>;
    async fn list_hosts(&self) -> Result<Vec<Host>>;
}

#[async_trait]
impl InventorySource for OlvmClient {
    async fn list_vms(&self) -> Result<Vec<Vm>> {
        self.vms().list().await
    }

    async fn list_clusters(&self) -> Result<Vec<Cluster>> {
        self.clusters().list().await
    }

    async fn list_hosts(&self) -> Result<Vec<Host>> {
        self.hosts().list().await
    }
}

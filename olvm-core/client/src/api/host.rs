//! 主机查询 API

use tracing::info;

use crate::client::OlvmClient;
use crate::error::Result;
use crate::models::{Host, HostsResponse};

/// 主机查询 API
pub struct HostApi<'a> {
    client: &'a OlvmClient,
}

impl<'a> HostApi<'a> {
    pub(crate) fn new(client: &'a OlvmClient) -> Self {
        Self { client }
    }

    /// 查询主机列表
    pub async fn list(self) -> Result<Vec<Host>> {
        let response: HostsResponse = self.client.get("/hosts").await?;
        let hosts = response.into_hosts();
        info!("查询主机列表: {} 台", hosts.len());
        Ok(hosts)
    }
}

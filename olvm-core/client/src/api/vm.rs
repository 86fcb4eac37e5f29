//! 虚拟机查询 API

use tracing::info;

use crate::client::OlvmClient;
use crate::error::Result;
use crate::models::{Vm, VmsResponse};

/// 虚拟机查询 API
pub struct VmApi<'a> {
    client: &'a OlvmClient,
}

impl<'a> VmApi<'a> {
    pub(crate) fn new(client: &'a OlvmClient) -> Self {
        Self { client }
    }

    /// 查询虚拟机列表
    ///
    /// 只取单页结果，集群/主机名称可能缺失，需由清单合并补全。
    pub async fn list(self) -> Result<Vec<Vm>> {
        let response: VmsResponse = self.client.get("/vms").await?;
        let vms = response.into_vms();
        info!("查询虚拟机列表: {} 台", vms.len());
        Ok(vms)
    }
}

//! 集群查询 API

use tracing::info;

use crate::client::OlvmClient;
use crate::error::Result;
use crate::models::{Cluster, ClustersResponse};

/// 集群查询 API
pub struct ClusterApi<'a> {
    client: &'a OlvmClient,
}

impl<'a> ClusterApi<'a> {
    pub(crate) fn new(client: &'a OlvmClient) -> Self {
        Self { client }
    }

    /// 查询集群列表
    pub async fn list(self) -> Result<Vec<Cluster>> {
        let response: ClustersResponse = self.client.get("/clusters").await?;
        let clusters = response.into_clusters();
        info!("查询集群列表: {} 个", clusters.len());
        Ok(clusters)
    }
}

//! 清单加载
//!
//! 并发查询虚拟机、集群、主机三个列表 (各自经过缓存)，再合并出带名称的虚拟机视图。

use std::sync::Arc;

use olvm_client::{Cluster, ErrorKind, Host, InventorySource, OlvmError, Result, Vm};
use tracing::info;

use crate::cache::{ResourceCache, ResourceKind};
use crate::enrich::enrich_vms;
use crate::summary::InventorySummary;
use crate::tree::{build_cluster_tree, ClusterGroup};

/// 一次加载得到的清单
#[derive(Debug, Clone)]
pub struct Inventory {
    /// 已补全集群/主机名称的虚拟机
    pub vms: Vec<Vm>,
    pub clusters: Arc<Vec<Cluster>>,
    pub hosts: Arc<Vec<Host>>,
}

impl Inventory {
    /// 集群树
    pub fn tree(&self) -> Vec<ClusterGroup> {
        build_cluster_tree(&self.vms)
    }

    /// 汇总指标
    pub fn summary(&self) -> InventorySummary {
        InventorySummary::from_vms(&self.vms)
    }
}

/// 视图状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    /// 请求进行中
    Loading,
    /// 任一依赖查询失败
    Failed { message: String, kind: ErrorKind },
    /// 数据就绪
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => ViewState::Ready(value),
            Err(e) => ViewState::from_error(&e),
        }
    }

    pub fn from_error(e: &OlvmError) -> Self {
        ViewState::Failed {
            message: e.to_string(),
            kind: e.kind(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewState<U> {
        match self {
            ViewState::Loading => ViewState::Loading,
            ViewState::Failed { message, kind } => ViewState::Failed { message, kind },
            ViewState::Ready(value) => ViewState::Ready(f(value)),
        }
    }
}

/// 清单加载器
pub struct InventoryLoader {
    source: Arc<dyn InventorySource>,
    cache: ResourceCache,
}

impl InventoryLoader {
    pub fn new(source: Arc<dyn InventorySource>) -> Self {
        Self::with_cache(source, ResourceCache::default())
    }

    pub fn with_cache(source: Arc<dyn InventorySource>, cache: ResourceCache) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// 加载完整清单
    ///
    /// 三个查询并发执行；多个失败时按 虚拟机 → 集群 → 主机 的顺序报告第一个错误。
    pub async fn load(&self) -> Result<Inventory> {
        let (vms, clusters, hosts) = tokio::join!(self.vms(), self.clusters(), self.hosts());

        let vms = vms?;
        let clusters = clusters?;
        let hosts = hosts?;

        let enriched = enrich_vms(&vms, &clusters, &hosts);
        info!(
            "清单加载完成: {} 台虚拟机, {} 个集群, {} 台主机",
            enriched.len(),
            clusters.len(),
            hosts.len()
        );

        Ok(Inventory {
            vms: enriched,
            clusters,
            hosts,
        })
    }

    /// 虚拟机列表 (未合并名称)
    pub async fn vms(&self) -> Result<Arc<Vec<Vm>>> {
        let source = Arc::clone(&self.source);
        self.cache.get_or_fetch(|| async move { source.list_vms().await }).await
    }

    pub async fn clusters(&self) -> Result<Arc<Vec<Cluster>>> {
        let source = Arc::clone(&self.source);
        self.cache.get_or_fetch(|| async move { source.list_clusters().await }).await
    }

    pub async fn hosts(&self) -> Result<Arc<Vec<Host>>> {
        let source = Arc::clone(&self.source);
        self.cache.get_or_fetch(|| async move { source.list_hosts().await }).await
    }

    /// 使某种资源的缓存失效，下次加载重新查询
    pub fn invalidate(&self, kind: ResourceKind) {
        self.cache.invalidate(kind);
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

//! 清单合并
//!
//! 引擎返回的虚拟机记录可能只带集群/主机 ID，也可能带内嵌名称。
//! 这里用集群和主机列表按 ID 补全名称，查到的名称总是优先。

use std::collections::HashMap;

use olvm_client::{Cluster, Host, Vm};

/// 集群/主机按 ID 的查找索引
#[derive(Debug, Default)]
pub struct InventoryIndex<'a> {
    clusters: HashMap<&'a str, &'a Cluster>,
    hosts: HashMap<&'a str, &'a Host>,
}

impl<'a> InventoryIndex<'a> {
    pub fn new(clusters: &'a [Cluster], hosts: &'a [Host]) -> Self {
        Self {
            clusters: clusters.iter().map(|c| (c.id.as_str(), c)).collect(),
            hosts: hosts.iter().map(|h| (h.id.as_str(), h)).collect(),
        }
    }

    pub fn cluster(&self, id: &str) -> Option<&'a Cluster> {
        self.clusters.get(id).copied()
    }

    pub fn host(&self, id: &str) -> Option<&'a Host> {
        self.hosts.get(id).copied()
    }

    /// 补全单台虚拟机的集群/主机名称，查不到时保留原有名称
    pub fn enrich(&self, vm: &Vm) -> Vm {
        let mut enriched = vm.clone();

        if let Some(cluster) = vm.cluster_id.as_deref().and_then(|id| self.cluster(id)) {
            enriched.cluster_name = Some(cluster.name.clone());
        }
        if let Some(host) = vm.host_id.as_deref().and_then(|id| self.host(id)) {
            enriched.host_name = Some(host.name.clone());
        }

        enriched
    }
}

/// 合并三个列表，返回补全名称后的新虚拟机列表
pub fn enrich_vms(vms: &[Vm], clusters: &[Cluster], hosts: &[Host]) -> Vec<Vm> {
    let index = InventoryIndex::new(clusters, hosts);
    vms.iter().map(|vm| index.enrich(vm)).collect()
}

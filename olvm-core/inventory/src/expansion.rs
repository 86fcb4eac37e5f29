//! 树展开状态
//!
//! 以名称为键，树重建后只要名称不变，展开状态就保持。
//! 未显式设置时，只有第一个集群和第一个集群的第一个主机默认展开。

use std::collections::HashMap;

use crate::tree::ClusterGroup;

#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    clusters: HashMap<String, bool>,
    hosts: HashMap<(String, String), bool>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 集群是否展开，`index` 为集群在树中的位置
    pub fn is_cluster_expanded(&self, cluster: &str, index: usize) -> bool {
        self.clusters.get(cluster).copied().unwrap_or(index == 0)
    }

    /// 主机是否展开，`cluster_index` / `host_index` 为树中的位置
    pub fn is_host_expanded(
        &self,
        cluster: &str,
        host: &str,
        cluster_index: usize,
        host_index: usize,
    ) -> bool {
        self.hosts
            .get(&(cluster.to_string(), host.to_string()))
            .copied()
            .unwrap_or(cluster_index == 0 && host_index == 0)
    }

    pub fn set_cluster(&mut self, cluster: &str, expanded: bool) {
        self.clusters.insert(cluster.to_string(), expanded);
    }

    pub fn set_host(&mut self, cluster: &str, host: &str, expanded: bool) {
        self.hosts
            .insert((cluster.to_string(), host.to_string()), expanded);
    }

    /// 切换集群展开状态
    pub fn toggle_cluster(&mut self, tree: &[ClusterGroup], cluster: &str) {
        let index = tree.iter().position(|c| c.name == cluster).unwrap_or(usize::MAX);
        let current = self.is_cluster_expanded(cluster, index);
        self.set_cluster(cluster, !current);
    }

    /// 切换主机展开状态
    pub fn toggle_host(&mut self, tree: &[ClusterGroup], cluster: &str, host: &str) {
        let (cluster_index, host_index) = tree
            .iter()
            .enumerate()
            .find(|(_, c)| c.name == cluster)
            .and_then(|(ci, c)| c.hosts.iter().position(|h| h.name == host).map(|hi| (ci, hi)))
            .unwrap_or((usize::MAX, usize::MAX));
        let current = self.is_host_expanded(cluster, host, cluster_index, host_index);
        self.set_host(cluster, host, !current);
    }

    /// 展开树中的所有集群和主机
    pub fn expand_all(&mut self, tree: &[ClusterGroup]) {
        for cluster in tree {
            self.set_cluster(&cluster.name, true);
            for host in &cluster.hosts {
                self.set_host(&cluster.name, &host.name, true);
            }
        }
    }
}

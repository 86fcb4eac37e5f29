//! 数据中心汇总指标

use std::collections::HashSet;

use olvm_client::Vm;
use serde::Serialize;

use crate::tree::INACTIVE_HOST;

/// 仪表盘汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    /// 不同集群名称数
    pub clusters: usize,
    /// 不同主机名称数 (不含非活动桶)
    pub hosts: usize,
    /// 虚拟机总数
    pub total: usize,
    /// 状态为 up / running 的虚拟机
    pub running: usize,
    /// 其余虚拟机
    pub stopped: usize,
    /// 未分配主机的虚拟机
    pub inactive: usize,
}

impl InventorySummary {
    pub fn from_vms(vms: &[Vm]) -> Self {
        let mut clusters = HashSet::new();
        let mut hosts = HashSet::new();
        let mut running = 0;
        let mut inactive = 0;

        for vm in vms {
            if let Some(cluster) = vm.cluster_name.as_deref().filter(|n| !n.is_empty()) {
                clusters.insert(cluster);
            }

            match vm.host_name.as_deref().filter(|n| !n.is_empty()) {
                Some(host) if host != INACTIVE_HOST => {
                    hosts.insert(host);
                }
                Some(_) => {}
                None => inactive += 1,
            }

            if vm.is_running() {
                running += 1;
            }
        }

        Self {
            clusters: clusters.len(),
            hosts: hosts.len(),
            total: vms.len(),
            running,
            stopped: vms.len() - running,
            inactive,
        }
    }
}

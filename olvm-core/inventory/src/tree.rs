//! 集群树构建
//!
//! 把扁平的虚拟机列表分组为 集群 → 主机 → 虚拟机 三层树。
//! 分组键是显示名称而非 ID，同名集群会合并为一组。
//!
//! 排序规则 (见 [`collate`]):
//! - 集群按名称升序
//! - 主机按名称升序，`Inactive VMs` 桶始终排在最后
//! - 虚拟机按名称升序，同名时依次按 ID、状态及其余字段
//!
//! 输出只取决于输入集合本身，与输入顺序无关。

use std::cmp::Ordering;
use std::collections::BTreeMap;

use olvm_client::Vm;
use serde::Serialize;

/// 未分配集群的虚拟机归入的集群名
pub const UNASSIGNED_CLUSTER: &str = "Unassigned cluster";

/// 未分配主机的虚拟机归入的主机桶名
///
/// 真实主机恰好叫这个名字时也会被当作非活动桶，这是已知限制。
pub const INACTIVE_HOST: &str = "Inactive VMs";

/// 集群分组
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterGroup {
    pub name: String,
    pub hosts: Vec<HostGroup>,
}

/// 主机分组
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostGroup {
    pub name: String,
    pub vms: Vec<Vm>,
}

impl ClusterGroup {
    /// 集群下虚拟机总数
    pub fn vm_count(&self) -> usize {
        self.hosts.iter().map(|h| h.vms.len()).sum()
    }
}

impl HostGroup {
    /// 是否为非活动虚拟机桶
    pub fn is_inactive(&self) -> bool {
        self.name == INACTIVE_HOST
    }
}

/// 名称比较，与浏览器默认的 `localeCompare` 一致
///
/// 1. 忽略大小写逐字符比较
/// 2. 仅大小写不同时，第一个不同位置上小写在前 (`apple` < `Apple`)
/// 3. 最后按字节比较，保证不同字符串之间是全序
pub fn collate(a: &str, b: &str) -> Ordering {
    let folded = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<_>>();

    folded(a)
        .cmp(&folded(b))
        .then_with(|| case_order(a, b))
        .then_with(|| a.cmp(b))
}

fn case_order(a: &str, b: &str) -> Ordering {
    for (x, y) in a.chars().zip(b.chars()) {
        if x == y {
            continue;
        }
        match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}

/// 按 [`collate`] 排序的分组键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NameKey<'a>(&'a str);

impl Ord for NameKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        collate(self.0, other.0)
    }
}

impl PartialOrd for NameKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 同一主机下虚拟机的顺序
///
/// 名称相同的记录继续比较其余字段，完全相同的记录谁先谁后不影响输出。
fn vm_order(a: &Vm, b: &Vm) -> Ordering {
    collate(&a.name, &b.name)
        .then_with(|| a.id.cmp(&b.id))
        .then_with(|| a.status.cmp(&b.status))
        .then_with(|| a.cluster_id.cmp(&b.cluster_id))
        .then_with(|| a.host_id.cmp(&b.host_id))
        .then_with(|| a.cluster_name.cmp(&b.cluster_name))
        .then_with(|| a.host_name.cmp(&b.host_name))
}

/// 缺失或为空时使用哨兵名称
fn display_name<'a>(name: Option<&'a str>, fallback: &'a str) -> &'a str {
    match name {
        Some(name) if !name.is_empty() => name,
        _ => fallback,
    }
}

/// 按 集群 → 主机 → 虚拟机 构建有序树
pub fn build_cluster_tree(vms: &[Vm]) -> Vec<ClusterGroup> {
    let mut clusters: BTreeMap<NameKey<'_>, BTreeMap<NameKey<'_>, Vec<&Vm>>> = BTreeMap::new();

    for vm in vms {
        let cluster = display_name(vm.cluster_name.as_deref(), UNASSIGNED_CLUSTER);
        let host = display_name(vm.host_name.as_deref(), INACTIVE_HOST);
        clusters
            .entry(NameKey(cluster))
            .or_default()
            .entry(NameKey(host))
            .or_default()
            .push(vm);
    }

    clusters
        .into_iter()
        .map(|(NameKey(cluster_name), hosts)| {
            let mut inactive = None;
            let mut groups = Vec::with_capacity(hosts.len());

            for (NameKey(host_name), mut host_vms) in hosts {
                host_vms.sort_by(|a, b| vm_order(a, b));
                let group = HostGroup {
                    name: host_name.to_string(),
                    vms: host_vms.into_iter().cloned().collect(),
                };

                if group.is_inactive() {
                    inactive = Some(group);
                } else {
                    groups.push(group);
                }
            }
            groups.extend(inactive);

            ClusterGroup {
                name: cluster_name.to_string(),
                hosts: groups,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vm(id: &str, name: &str, cluster: Option<&str>, host: Option<&str>) -> Vm {
        Vm {
            id: id.to_string(),
            name: name.to_string(),
            status: None,
            cluster_id: None,
            cluster_name: cluster.map(str::to_string),
            host_id: None,
            host_name: host.map(str::to_string),
        }
    }

    fn shape(tree: &[ClusterGroup]) -> Vec<(String, Vec<(String, Vec<String>)>)> {
        tree.iter()
            .map(|c| {
                (
                    c.name.clone(),
                    c.hosts
                        .iter()
                        .map(|h| (h.name.clone(), h.vms.iter().map(|v| v.id.clone()).collect()))
                        .collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_basic_scenario() {
        let mut vms = vec![
            vm("1", "vmB", Some("C1"), Some("h1")),
            vm("2", "vmA", Some("C1"), Some("h1")),
            vm("3", "vmC", None, None),
        ];
        vms[0].status = Some("up".into());
        vms[1].status = Some("down".into());

        let tree = build_cluster_tree(&vms);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].name, "C1");
        assert_eq!(tree[0].hosts[0].name, "h1");
        let names: Vec<_> = tree[0].hosts[0].vms.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["vmA", "vmB"]);

        assert_eq!(tree[1].name, UNASSIGNED_CLUSTER);
        assert_eq!(tree[1].hosts[0].name, INACTIVE_HOST);
        assert_eq!(tree[1].hosts[0].vms[0].name, "vmC");
    }

    #[test]
    fn test_inactive_bucket_sorts_last() {
        let vms = vec![
            vm("1", "a", Some("C"), None),
            vm("2", "b", Some("C"), Some("zeta")),
            vm("3", "c", Some("C"), Some("Alpha")),
            vm("4", "d", Some("C"), Some("omega")),
        ];
        let tree = build_cluster_tree(&vms);
        let hosts: Vec<_> = tree[0].hosts.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(hosts, vec!["Alpha", "omega", "zeta", INACTIVE_HOST]);
        assert!(tree[0].hosts[3].is_inactive());
    }

    #[test]
    fn test_collate_matches_locale_order() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("Banana", "cherry"), Ordering::Less);
        assert_eq!(collate("apple", "Apple"), Ordering::Less);
        assert_eq!(collate("kvm-a", "KVM-b"), Ordering::Less);
        assert_eq!(collate("vm1", "vm10"), Ordering::Less);
        assert_eq!(collate("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_mixed_case_names_sort_case_insensitively() {
        let vms = vec![
            vm("1", "zulu", Some("Banana"), Some("Kvm02")),
            vm("2", "Mike", Some("apple"), Some("kvm03")),
            vm("3", "alpha", Some("apple"), Some("KVM01")),
            vm("4", "Alpha", Some("apple"), Some("KVM01")),
            vm("5", "bravo", Some("apple"), Some("KVM01")),
            vm("6", "x", Some("Apple"), None),
            vm("7", "y", Some("cherry"), Some("h")),
        ];
        let tree = build_cluster_tree(&vms);

        let clusters: Vec<_> = tree.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(clusters, vec!["apple", "Apple", "Banana", "cherry"]);

        let hosts: Vec<_> = tree[0].hosts.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(hosts, vec!["KVM01", "kvm03"]);

        let names: Vec<_> = tree[0].hosts[0].vms.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Alpha", "bravo"]);

        // 非活动桶仍在最后
        let mut more = vms.clone();
        more.push(vm("8", "z", Some("apple"), Some("zzz")));
        more.push(vm("9", "w", Some("apple"), None));
        let tree = build_cluster_tree(&more);
        let hosts: Vec<_> = tree[0].hosts.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(hosts, vec!["KVM01", "kvm03", "zzz", INACTIVE_HOST]);
    }

    #[test]
    fn test_duplicate_records_order_by_status() {
        let mut up = vm("1", "web", Some("C"), Some("h1"));
        up.status = Some("up".into());
        let mut down = vm("1", "web", Some("C"), Some("h1"));
        down.status = Some("down".into());

        let forward = build_cluster_tree(&[up.clone(), down.clone()]);
        let backward = build_cluster_tree(&[down, up]);
        assert_eq!(forward, backward);

        let statuses: Vec<_> =
            forward[0].hosts[0].vms.iter().map(|v| v.status.as_deref()).collect();
        assert_eq!(statuses, vec![Some("down"), Some("up")]);
    }

    #[test]
    fn test_empty_names_use_sentinels() {
        let vms = vec![vm("1", "a", Some(""), Some(""))];
        let tree = build_cluster_tree(&vms);
        assert_eq!(tree[0].name, UNASSIGNED_CLUSTER);
        assert_eq!(tree[0].hosts[0].name, INACTIVE_HOST);
    }

    #[test]
    fn test_same_name_clusters_collapse() {
        let mut a = vm("1", "a", Some("Default"), Some("h1"));
        a.cluster_id = Some("c1".into());
        let mut b = vm("2", "b", Some("Default"), Some("h2"));
        b.cluster_id = Some("c2".into());

        let tree = build_cluster_tree(&[a, b]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].hosts.len(), 2);
        assert_eq!(tree[0].vm_count(), 2);
    }

    #[test]
    fn test_real_host_named_like_sentinel_is_merged() {
        let vms = vec![
            vm("1", "a", Some("C"), Some(INACTIVE_HOST)),
            vm("2", "b", Some("C"), None),
            vm("3", "c", Some("C"), Some("h1")),
        ];
        let tree = build_cluster_tree(&vms);
        assert_eq!(tree[0].hosts.len(), 2);
        assert_eq!(tree[0].hosts[1].name, INACTIVE_HOST);
        assert_eq!(tree[0].hosts[1].vms.len(), 2);
    }

    #[test]
    fn test_permutation_invariance() {
        let vms = vec![
            vm("1", "web", Some("prod"), Some("kvm02")),
            vm("2", "db", Some("prod"), Some("kvm01")),
            vm("3", "cache", Some("prod"), None),
            vm("4", "web", Some("prod"), Some("kvm02")),
            vm("5", "ci", Some("Dev"), Some("kvm09")),
            vm("6", "orphan", None, Some("kvm03")),
            vm("7", "build", Some("Dev"), None),
        ];
        let expected = shape(&build_cluster_tree(&vms));

        // 固定种子的简单洗牌，覆盖多种输入顺序
        let mut permuted = vms.clone();
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for _ in 0..50 {
            for i in (1..permuted.len()).rev() {
                seed ^= seed << 13;
                seed ^= seed >> 7;
                seed ^= seed << 17;
                let j = (seed % (i as u64 + 1)) as usize;
                permuted.swap(i, j);
            }
            assert_eq!(shape(&build_cluster_tree(&permuted)), expected);
        }

        permuted.reverse();
        assert_eq!(shape(&build_cluster_tree(&permuted)), expected);
    }

    #[test]
    fn test_empty_input() {
        assert!(build_cluster_tree(&[]).is_empty());
    }
}

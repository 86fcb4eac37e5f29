//! 集群树视图
//!
//! 数据中心 → 集群 → 主机 → 虚拟机，折叠的节点只显示一行。

use anyhow::{bail, Result};
use olvm_inventory::{ClusterGroup, ExpansionState, ViewState};
use tracing::warn;

use crate::commands::common::{create_loader, load_inventory, report_failure};
use crate::config::AppConfig;

const LOADING: &str = "Loading inventory...";
const FAILED: &str = "Failed to load inventory";
const EMPTY: &str = "No VMs found";

/// 展开/折叠选项
#[derive(Debug, Default)]
pub struct TreeOptions {
    pub expand: Vec<String>,
    pub collapse: Vec<String>,
    pub expand_host: Vec<String>,
    pub collapse_host: Vec<String>,
    pub all: bool,
}

pub async fn handle(config_path: Option<&str>, options: TreeOptions) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let loader = create_loader(&config)?;

    let state = load_inventory(&loader, LOADING).await.map(|inventory| inventory.tree());
    let expansion = match &state {
        ViewState::Ready(tree) => build_expansion(tree, &options)?,
        _ => ExpansionState::new(),
    };

    println!("Datacenter: {}", config.view.datacenter);
    print!("{}", render_tree(&state, &expansion));

    if let ViewState::Failed { message, kind } = &state {
        report_failure(FAILED, message, *kind);
    }
    Ok(())
}

/// 解析 `CLUSTER::HOST`
fn parse_host_key(spec: &str) -> Result<(&str, &str)> {
    match spec.split_once("::") {
        Some((cluster, host)) if !cluster.is_empty() && !host.is_empty() => Ok((cluster, host)),
        _ => bail!("主机参数格式应为 CLUSTER::HOST: {}", spec),
    }
}

/// 根据命令行选项构建展开状态
pub fn build_expansion(tree: &[ClusterGroup], options: &TreeOptions) -> Result<ExpansionState> {
    let mut state = ExpansionState::new();
    if options.all {
        state.expand_all(tree);
    }

    let known_cluster = |name: &str| tree.iter().any(|c| c.name == name);
    let known_host = |cluster: &str, host: &str| {
        tree.iter()
            .any(|c| c.name == cluster && c.hosts.iter().any(|h| h.name == host))
    };

    for (names, expanded) in [(&options.expand, true), (&options.collapse, false)] {
        for name in names {
            if !known_cluster(name) {
                warn!("集群不存在: {}", name);
            }
            state.set_cluster(name, expanded);
        }
    }

    for (specs, expanded) in [(&options.expand_host, true), (&options.collapse_host, false)] {
        for spec in specs {
            let (cluster, host) = parse_host_key(spec)?;
            if !known_host(cluster, host) {
                warn!("主机不存在: {}::{}", cluster, host);
            }
            state.set_host(cluster, host, expanded);
        }
    }

    Ok(state)
}

fn vm_count_label(count: usize) -> String {
    match count {
        0 => "No VMs".to_string(),
        1 => "1 VM".to_string(),
        n => format!("{} VMs", n),
    }
}

fn marker(expanded: bool) -> &'static str {
    if expanded {
        "▾"
    } else {
        "▸"
    }
}

/// 渲染树视图
pub fn render_tree(state: &ViewState<Vec<ClusterGroup>>, expansion: &ExpansionState) -> String {
    let tree = match state {
        ViewState::Loading => return format!("{}\n", LOADING),
        ViewState::Failed { .. } => return format!("{}\n", FAILED),
        ViewState::Ready(tree) if tree.is_empty() => return format!("{}\n", EMPTY),
        ViewState::Ready(tree) => tree,
    };

    let mut out = String::new();
    for (ci, cluster) in tree.iter().enumerate() {
        let cluster_expanded = expansion.is_cluster_expanded(&cluster.name, ci);
        out.push_str(&format!(
            "{} {} (Hosts: {})\n",
            marker(cluster_expanded),
            cluster.name,
            cluster.hosts.len()
        ));
        if !cluster_expanded {
            continue;
        }

        for (hi, host) in cluster.hosts.iter().enumerate() {
            let host_expanded = expansion.is_host_expanded(&cluster.name, &host.name, ci, hi);
            out.push_str(&format!(
                "  {} {} ({})\n",
                marker(host_expanded),
                host.name,
                vm_count_label(host.vms.len())
            ));
            if !host_expanded {
                continue;
            }

            for vm in &host.vms {
                out.push_str(&format!(
                    "      {} [{}]\n",
                    vm.name,
                    vm.status.as_deref().unwrap_or("-")
                ));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use olvm_client::{ErrorKind, Vm};
    use olvm_inventory::build_cluster_tree;

    fn vm(id: &str, name: &str, status: Option<&str>, cluster: Option<&str>, host: Option<&str>) -> Vm {
        Vm {
            id: id.to_string(),
            name: name.to_string(),
            status: status.map(str::to_string),
            cluster_id: None,
            cluster_name: cluster.map(str::to_string),
            host_id: None,
            host_name: host.map(str::to_string),
        }
    }

    fn sample_tree() -> Vec<ClusterGroup> {
        build_cluster_tree(&[
            vm("1", "vmB", Some("up"), Some("C1"), Some("h1")),
            vm("2", "vmA", Some("down"), Some("C1"), Some("h1")),
            vm("3", "vmC", None, None, None),
            vm("4", "vmD", Some("up"), Some("C1"), Some("h2")),
        ])
    }

    #[test]
    fn test_default_expansion() {
        let out = render_tree(&ViewState::Ready(sample_tree()), &ExpansionState::new());
        assert_eq!(
            out,
            "▾ C1 (Hosts: 2)\n\
             \x20 ▾ h1 (2 VMs)\n\
             \x20     vmA [down]\n\
             \x20     vmB [up]\n\
             \x20 ▸ h2 (1 VM)\n\
             ▸ Unassigned cluster (Hosts: 1)\n"
        );
    }

    #[test]
    fn test_expand_all() {
        let tree = sample_tree();
        let options = TreeOptions {
            all: true,
            ..Default::default()
        };
        let expansion = build_expansion(&tree, &options).unwrap();
        let out = render_tree(&ViewState::Ready(tree), &expansion);
        assert!(out.contains("  ▾ Inactive VMs (1 VM)\n      vmC [-]\n"));
        assert!(out.contains("  ▾ h2 (1 VM)\n      vmD [up]\n"));
    }

    #[test]
    fn test_collapse_and_expand_host() {
        let tree = sample_tree();
        let options = TreeOptions {
            expand_host: vec!["C1::h2".to_string()],
            collapse_host: vec!["C1::h1".to_string()],
            ..Default::default()
        };
        let expansion = build_expansion(&tree, &options).unwrap();
        let out = render_tree(&ViewState::Ready(tree), &expansion);
        assert!(out.contains("  ▸ h1 (2 VMs)\n  ▾ h2 (1 VM)\n      vmD [up]\n"));
    }

    #[test]
    fn test_invalid_host_spec() {
        let options = TreeOptions {
            expand_host: vec!["C1/h1".to_string()],
            ..Default::default()
        };
        assert!(build_expansion(&sample_tree(), &options).is_err());
    }

    #[test]
    fn test_states() {
        let expansion = ExpansionState::new();
        assert_eq!(render_tree(&ViewState::Loading, &expansion), "Loading inventory...\n");
        assert_eq!(
            render_tree(
                &ViewState::Failed {
                    message: "boom".into(),
                    kind: ErrorKind::Transport
                },
                &expansion
            ),
            "Failed to load inventory\n"
        );
        assert_eq!(render_tree(&ViewState::Ready(vec![]), &expansion), "No VMs found\n");
    }

    #[test]
    fn test_vm_count_label() {
        assert_eq!(vm_count_label(0), "No VMs");
        assert_eq!(vm_count_label(1), "1 VM");
        assert_eq!(vm_count_label(3), "3 VMs");
    }
}

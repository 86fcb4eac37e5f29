//! 虚拟机列表视图

use anyhow::Result;
use olvm_client::Vm;
use olvm_inventory::ViewState;
use serde::Serialize;

use crate::commands::common::{create_loader, load_inventory, report_failure};
use crate::commands::output::{output_formatted, OutputFormat, TableRow};
use crate::config::AppConfig;

const EMPTY: &str = "No virtual machines found.";

/// 表格中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VmRow {
    pub id: String,
    pub name: String,
    pub status: String,
    pub cluster: String,
    pub host: String,
}

impl From<&Vm> for VmRow {
    fn from(vm: &Vm) -> Self {
        let or_dash = |value: Option<&str>| value.unwrap_or("-").to_string();
        Self {
            id: vm.id.clone(),
            name: vm.name.clone(),
            status: or_dash(vm.status.as_deref()),
            cluster: or_dash(vm.cluster_name.as_deref()),
            host: or_dash(vm.host_name.as_deref()),
        }
    }
}

impl TableRow for VmRow {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "Status", "Cluster", "Host"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.status.clone(),
            self.cluster.clone(),
            self.host.clone(),
        ]
    }
}

pub async fn handle(config_path: Option<&str>, format: OutputFormat) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let loader = create_loader(&config)?;

    let state = load_inventory(&loader, "Loading virtual machines...").await;
    match state {
        ViewState::Ready(inventory) => {
            let rows: Vec<VmRow> = inventory.vms.iter().map(VmRow::from).collect();
            output_formatted(&rows, format, EMPTY)
        }
        ViewState::Failed { message, kind } => {
            report_failure("Error loading virtual machines", &message, kind)
        }
        ViewState::Loading => Ok(()),
    }
}

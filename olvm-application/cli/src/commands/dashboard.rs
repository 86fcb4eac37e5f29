//! 数据中心仪表盘视图

use anyhow::Result;
use olvm_inventory::{InventorySummary, ViewState};
use serde::Serialize;

use crate::commands::common::{create_loader, load_inventory, report_failure};
use crate::commands::output::{render_json, render_table, render_yaml, OutputFormat, TableRow};
use crate::config::AppConfig;

/// 仪表盘数据
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub datacenter: String,
    #[serde(flatten)]
    pub summary: InventorySummary,
}

/// 单个指标卡片
struct Tile {
    title: &'static str,
    value: String,
    detail: String,
}

impl TableRow for Tile {
    fn headers() -> Vec<&'static str> {
        vec!["Tile", "Count", "Detail"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.title.to_string(), self.value.clone(), self.detail.clone()]
    }
}

impl DashboardView {
    fn tiles(&self) -> Vec<Tile> {
        let tile = |title, value: usize, detail: &str| Tile {
            title,
            value: value.to_string(),
            detail: detail.to_string(),
        };
        vec![
            tile("Data centers", 1, &self.datacenter),
            tile("Clusters", self.summary.clusters, "From VM metadata"),
            tile("Hosts", self.summary.hosts, "Unique VM host names"),
            tile("Virtual machines", self.summary.total, "All VMs in this environment"),
            tile("Running VMs", self.summary.running, "Status = up / running"),
            tile("Stopped VMs", self.summary.stopped, "All other statuses"),
            tile("Inactive VMs", self.summary.inactive, "VMs without a host assignment"),
        ]
    }

    pub fn render(&self) -> String {
        format!("Datacenter summary\n\n{}", render_table(&self.tiles(), ""))
    }
}

pub async fn handle(config_path: Option<&str>, format: OutputFormat) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let loader = create_loader(&config)?;

    let state = load_inventory(&loader, "Loading datacenter metrics...").await;
    match state {
        ViewState::Ready(inventory) => {
            let view = DashboardView {
                datacenter: config.view.datacenter.clone(),
                summary: inventory.summary(),
            };
            match format {
                OutputFormat::Json => println!("{}", render_json(&view)?),
                OutputFormat::Yaml => print!("{}", render_yaml(&view)?),
                OutputFormat::Table => print!("{}", view.render()),
            }
            Ok(())
        }
        ViewState::Failed { message, kind } => {
            report_failure("Error loading datacenter metrics", &message, kind)
        }
        ViewState::Loading => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> DashboardView {
        DashboardView {
            datacenter: "home.lab".to_string(),
            summary: InventorySummary {
                clusters: 1,
                hosts: 1,
                total: 3,
                running: 1,
                stopped: 2,
                inactive: 1,
            },
        }
    }

    #[test]
    fn test_render_tiles() {
        let out = view().render();
        assert!(out.starts_with("Datacenter summary\n"));
        assert!(out.contains("Data centers      1      home.lab\n"));
        assert!(out.contains("Virtual machines  3      All VMs in this environment\n"));
        assert!(out.contains("Running VMs       1      Status = up / running\n"));
        assert!(out.contains("Stopped VMs       2      All other statuses\n"));
    }

    #[test]
    fn test_json_is_flat() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&view()).unwrap()).unwrap();
        assert_eq!(json["datacenter"], "home.lab");
        assert_eq!(json["total"], 3);
        assert_eq!(json["running"], 1);
    }
}

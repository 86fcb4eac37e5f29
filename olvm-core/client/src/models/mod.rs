//! OLVM 数据模型
//!
//! 分为两层:
//! - 线上模型 (`*ApiModel` / `*Response`): 与引擎 REST API 的 JSON 结构一一对应
//! - 规范化实体 (`Vm` / `Cluster` / `Host`): 供清单合并、树构建和视图层使用
//!
//! **当前数据来源**: 引擎 REST API (实时查询,无本地持久化)

use serde::{Deserialize, Serialize};

// ============================================
// 规范化实体
// ============================================

/// 虚拟机信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vm {
    /// 虚拟机 ID
    pub id: String,

    /// 虚拟机名称
    pub name: String,

    /// 运行状态 (如 "up" / "down")，原样保留
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// 所属集群 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,

    /// 所属集群名称
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,

    /// 所在主机 ID，没有主机即为非活动虚拟机
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,

    /// 所在主机名称
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
}

impl Vm {
    /// 是否为非活动虚拟机 (未分配主机)
    pub fn is_inactive(&self) -> bool {
        self.host_id.is_none() && self.host_name.is_none()
    }

    /// 状态是否为运行中 (`up` / `running`，忽略大小写)
    pub fn is_running(&self) -> bool {
        let status = self
            .status
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();
        status == "up" || status == "running"
    }
}

/// 集群信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub name: String,
}

/// 主机信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub id: String,
    pub name: String,
}

// ============================================
// 线上模型
// ============================================

/// 对其他资源的引用 (`{ id, name? }`)
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// 虚拟机状态
///
/// 文档形态为 `{ "state": "up" }`，v4 引擎实际返回裸字符串 `"up"`，两者都接受。
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VmStatus {
    State { state: String },
    Plain(String),
}

impl VmStatus {
    pub fn into_state(self) -> String {
        match self {
            VmStatus::State { state } => state,
            VmStatus::Plain(state) => state,
        }
    }
}

/// `GET /vms` 中的单条记录
#[derive(Debug, Clone, Deserialize)]
pub struct VmApiModel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<VmStatus>,
    #[serde(default)]
    pub cluster: Option<ResourceRef>,
    #[serde(default)]
    pub host: Option<ResourceRef>,
}

/// `GET /clusters` / `GET /hosts` 中的单条记录
#[derive(Debug, Clone, Deserialize)]
pub struct NamedApiModel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `GET /vms` 响应
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VmsResponse {
    #[serde(default)]
    pub vm: Option<Vec<VmApiModel>>,
}

/// `GET /clusters` 响应
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClustersResponse {
    #[serde(default)]
    pub cluster: Option<Vec<NamedApiModel>>,
}

/// `GET /hosts` 响应
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostsResponse {
    #[serde(default)]
    pub host: Option<Vec<NamedApiModel>>,
}

/// 令牌端点响应
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// 名称为空或缺失时回退为 ID
fn name_or_id(name: Option<String>, id: &str) -> String {
    match name {
        Some(name) if !name.is_empty() => name,
        _ => id.to_string(),
    }
}

impl From<VmApiModel> for Vm {
    fn from(v: VmApiModel) -> Self {
        let name = name_or_id(v.name, &v.id);
        let (cluster_id, cluster_name) = match v.cluster {
            Some(c) => (Some(c.id), c.name),
            None => (None, None),
        };
        let (host_id, host_name) = match v.host {
            Some(h) => (Some(h.id), h.name),
            None => (None, None),
        };

        Self {
            id: v.id,
            name,
            status: v.status.map(VmStatus::into_state),
            cluster_id,
            cluster_name,
            host_id,
            host_name,
        }
    }
}

impl From<NamedApiModel> for Cluster {
    fn from(c: NamedApiModel) -> Self {
        Self {
            name: name_or_id(c.name, &c.id),
            id: c.id,
        }
    }
}

impl From<NamedApiModel> for Host {
    fn from(h: NamedApiModel) -> Self {
        Self {
            name: name_or_id(h.name, &h.id),
            id: h.id,
        }
    }
}

impl VmsResponse {
    pub fn into_vms(self) -> Vec<Vm> {
        self.vm.unwrap_or_default().into_iter().map(Vm::from).collect()
    }
}

impl ClustersResponse {
    pub fn into_clusters(self) -> Vec<Cluster> {
        self.cluster
            .unwrap_or_default()
            .into_iter()
            .map(Cluster::from)
            .collect()
    }
}

impl HostsResponse {
    pub fn into_hosts(self) -> Vec<Host> {
        self.host.unwrap_or_default().into_iter().map(Host::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vms_response_missing_array() {
        let resp: VmsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.into_vms().is_empty());
    }

    #[test]
    fn test_vm_status_shapes() {
        let resp: VmsResponse = serde_json::from_value(json!({
            "vm": [
                { "id": "1", "name": "a", "status": { "state": "up" } },
                { "id": "2", "name": "b", "status": "down" },
                { "id": "3", "name": "c" }
            ]
        }))
        .unwrap();

        let vms = resp.into_vms();
        assert_eq!(vms[0].status.as_deref(), Some("up"));
        assert_eq!(vms[1].status.as_deref(), Some("down"));
        assert_eq!(vms[2].status, None);
    }

    #[test]
    fn test_vm_refs_and_embedded_names() {
        let resp: VmsResponse = serde_json::from_value(json!({
            "vm": [{
                "id": "1",
                "name": "web",
                "cluster": { "id": "c1", "name": "Default" },
                "host": { "id": "h1" }
            }]
        }))
        .unwrap();

        let vm = &resp.into_vms()[0];
        assert_eq!(vm.cluster_id.as_deref(), Some("c1"));
        assert_eq!(vm.cluster_name.as_deref(), Some("Default"));
        assert_eq!(vm.host_id.as_deref(), Some("h1"));
        assert_eq!(vm.host_name, None);
        assert!(!vm.is_inactive());
    }

    #[test]
    fn test_name_defaults_to_id() {
        let resp: ClustersResponse = serde_json::from_value(json!({
            "cluster": [{ "id": "c1" }, { "id": "c2", "name": "" }, { "id": "c3", "name": "prod" }]
        }))
        .unwrap();

        let names: Vec<_> = resp.into_clusters().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["c1", "c2", "prod"]);

        let resp: HostsResponse =
            serde_json::from_value(json!({ "host": [{ "id": "h1" }] })).unwrap();
        assert_eq!(resp.into_hosts()[0].name, "h1");
    }

    #[test]
    fn test_is_running() {
        let mut vm = Vm {
            id: "1".into(),
            name: "a".into(),
            status: Some(" UP ".into()),
            cluster_id: None,
            cluster_name: None,
            host_id: None,
            host_name: None,
        };
        assert!(vm.is_running());
        vm.status = Some("Running".into());
        assert!(vm.is_running());
        vm.status = Some("down".into());
        assert!(!vm.is_running());
        vm.status = None;
        assert!(!vm.is_running());
        assert!(vm.is_inactive());
    }
}

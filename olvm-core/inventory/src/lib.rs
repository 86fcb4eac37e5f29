//! OLVM 清单
//!
//! 把引擎返回的扁平资源列表整理为视图可用的数据:
//! - 清单合并 (`enrich`): 按 ID 为虚拟机补全集群/主机名称
//! - 集群树 (`tree`): 集群 → 主机 → 虚拟机，确定性排序
//! - 汇总指标 (`summary`): 仪表盘计数
//! - 查询缓存 (`cache`) 与并发加载 (`loader`)
//! - 树展开状态 (`expansion`)

pub mod cache;
pub mod enrich;
pub mod expansion;
pub mod loader;
pub mod summary;
pub mod tree;

pub use cache::{ResourceCache, ResourceKind, DEFAULT_CACHE_TTL};
pub use enrich::{enrich_vms, InventoryIndex};
pub use expansion::ExpansionState;
pub use loader::{Inventory, InventoryLoader, ViewState};
pub use summary::InventorySummary;
pub use tree::{build_cluster_tree, collate, ClusterGroup, HostGroup, INACTIVE_HOST, UNASSIGNED_CLUSTER};

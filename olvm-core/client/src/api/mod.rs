//! OLVM 资源查询 API 模块
//!
//! 每个资源一个只读查询:
//! - 虚拟机 (VmApi)
//! - 集群 (ClusterApi)
//! - 主机 (HostApi)

pub mod cluster;
pub mod host;
pub mod vm;

pub use cluster::ClusterApi;
pub use host::HostApi;
pub use vm::VmApi;

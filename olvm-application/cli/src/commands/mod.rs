//! CLI 命令处理模块

pub mod common; // 公共工具函数
pub mod config;
pub mod dashboard;
pub mod output;
pub mod tree;
pub mod vms;

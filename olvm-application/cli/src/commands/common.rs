//! 公共工具函数模块
//!
//! 提供各命令模块共享的功能，包括：
//! - 清单加载器创建
//! - 加载中提示 (spinner)
//! - 错误横幅

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use olvm_client::{ErrorKind, OlvmClient};
use olvm_inventory::{Inventory, InventoryLoader, ResourceCache, ViewState};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::config::AppConfig;

/// 根据配置创建清单加载器
///
/// 凭据缺失时仍然创建，首次查询时以配置错误的形式呈现。
pub fn create_loader(config: &AppConfig) -> Result<InventoryLoader> {
    let credentials = config.credentials();
    if credentials.is_none() {
        warn!("未配置 OLVM 凭据 (OLVM_USER / OLVM_PASSWORD)");
    }

    let client = OlvmClient::new(&config.olvm.base_url, config.client_config(), credentials)
        .context("创建 OLVM 客户端失败")?;

    Ok(InventoryLoader::with_cache(
        Arc::new(client),
        ResourceCache::with_ttl(config.cache_ttl()),
    ))
}

/// 加载清单，等待期间在 stderr 显示 spinner
pub async fn load_inventory(loader: &InventoryLoader, loading_message: &str) -> ViewState<Inventory> {
    let spinner = spinner(loading_message);
    let state = ViewState::from_result(loader.load().await);
    spinner.finish_and_clear();
    state
}

/// 创建 spinner，非终端环境下 indicatif 自动隐藏
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// 错误横幅文本
pub fn render_failure(title: &str, message: &str, kind: ErrorKind) -> String {
    let mut out = format!("\n{}\n  {}\n", format!("✖ {}", title).red().bold(), message);
    let hint = match kind {
        ErrorKind::Configuration => Some(
            "提示: 设置 OLVM_USER / OLVM_PASSWORD，或在配置文件 [olvm] 中填写 username / password",
        ),
        ErrorKind::Authentication => Some("提示: 检查用户名 (如 admin@internal) 和密码"),
        ErrorKind::Transport => None,
    };
    if let Some(hint) = hint {
        out.push_str(&format!("  {}\n", hint.yellow()));
    }
    out
}

/// 在 stderr 打印错误横幅并以退出码 1 结束进程
///
/// 横幅已包含完整错误信息，不再交给 `main` 重复打印。
pub fn report_failure(title: &str, message: &str, kind: ErrorKind) -> ! {
    let _ = io::stdout().flush();
    eprint!("{}", render_failure(title, message, kind));
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_banner_includes_message_and_hint() {
        let banner = render_failure(
            "Error loading virtual machines",
            "配置错误: 缺少用户名或密码",
            ErrorKind::Configuration,
        );
        assert!(banner.contains("Error loading virtual machines"));
        assert!(banner.contains("  配置错误: 缺少用户名或密码\n"));
        assert!(banner.contains("OLVM_USER / OLVM_PASSWORD"));
        assert_eq!(banner.matches("配置错误").count(), 1);
    }

    #[test]
    fn test_transport_failure_has_no_hint() {
        let banner = render_failure("Failed to load inventory", "HTTP 错误: timeout", ErrorKind::Transport);
        assert!(banner.contains("HTTP 错误: timeout"));
        assert!(!banner.contains("提示"));
    }
}

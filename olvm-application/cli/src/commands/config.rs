//! 配置查看命令

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::ConfigAction;

pub async fn handle(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = AppConfig::load(config_path)?;
            let rendered = toml::to_string_pretty(&config.masked()).context("序列化配置失败")?;
            print!("{}", rendered);
            if config.credentials().is_none() {
                eprintln!("# 未配置凭据: 设置 OLVM_USER / OLVM_PASSWORD");
            }
        }
    }
    Ok(())
}

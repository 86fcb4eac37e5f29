//! OLVM CLI 应用

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::output::OutputFormat;
use commands::tree::TreeOptions;

#[derive(Parser)]
#[command(name = "olvm")]
#[command(about = "OLVM Manager - 虚拟机清单查看工具", long_about = None)]
#[command(version)]
struct Cli {
    /// 日志级别 (OLVM_LOG_LEVEL 优先)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// 配置文件路径
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 集群 → 主机 → 虚拟机 树视图
    Tree {
        /// 展开集群
        #[arg(long, value_name = "CLUSTER")]
        expand: Vec<String>,

        /// 折叠集群
        #[arg(long, value_name = "CLUSTER")]
        collapse: Vec<String>,

        /// 展开主机 (CLUSTER::HOST)
        #[arg(long, value_name = "CLUSTER::HOST")]
        expand_host: Vec<String>,

        /// 折叠主机 (CLUSTER::HOST)
        #[arg(long, value_name = "CLUSTER::HOST")]
        collapse_host: Vec<String>,

        /// 展开全部节点
        #[arg(short, long)]
        all: bool,
    },

    /// 虚拟机列表
    Vms {
        /// 输出格式 (table/json/yaml)
        #[arg(short = 'f', long, default_value = "table")]
        format: OutputFormat,
    },

    /// 数据中心汇总
    Dashboard {
        /// 输出格式 (table/json/yaml)
        #[arg(short = 'f', long, default_value = "table")]
        format: OutputFormat,
    },

    /// 配置管理
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// 显示生效的配置 (密码已隐藏)
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志，输出到 stderr 以保持 stdout 可被管道处理
    let filter = EnvFilter::try_from_env("OLVM_LOG_LEVEL")
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("OLVM CLI 启动");

    let config = cli.config.as_deref();

    // 处理命令
    match cli.command {
        Commands::Tree {
            expand,
            collapse,
            expand_host,
            collapse_host,
            all,
        } => {
            let options = TreeOptions {
                expand,
                collapse,
                expand_host,
                collapse_host,
                all,
            };
            commands::tree::handle(config, options).await?
        }
        Commands::Vms { format } => commands::vms::handle(config, format).await?,
        Commands::Dashboard { format } => commands::dashboard::handle(config, format).await?,
        Commands::Config { action } => commands::config::handle(config, action).await?,
    }

    Ok(())
}

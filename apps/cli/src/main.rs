//! # Mazda CLI
//!
//! Command-line tools for the Mazda LKAS / cruise-button controller.
//!
//! ```bash
//! # 计算一帧转向指令的校验和
//! mazda-cli checksum --steer -120 --frame 7 --bit1
//!
//! # 查看参数文件解析出的配置
//! mazda-cli params params.toml
//!
//! # 离线运行场景
//! mazda-cli simulate scenario.json --params params.toml
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod scenario;

use commands::{ChecksumCommand, ParamsCommand, SimulateCommand};

/// Mazda CLI - 控制器离线工具
#[derive(Parser, Debug)]
#[command(name = "mazda-cli")]
#[command(about = "Offline tools for the Mazda LKAS and cruise-button controller", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 计算转向帧信号与校验和
    Checksum {
        #[command(flatten)]
        args: ChecksumCommand,
    },

    /// 解析参数文件
    Params {
        #[command(flatten)]
        args: ParamsCommand,
    },

    /// 按场景文件运行控制器
    Simulate {
        #[command(flatten)]
        args: SimulateCommand,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mazda_cli=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Checksum { args } => args.execute(),
        Commands::Params { args } => args.execute(),
        Commands::Simulate { args } => args.execute(),
    }
}

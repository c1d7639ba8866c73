//! params 命令
//!
//! 解析参数文件，显示控制器将使用的配置

use anyhow::{Context, Result};
use clap::Args;
use mazda_control::{CruiseConfig, LongitudinalTuning, TomlParams};
use serde::Serialize;
use std::path::PathBuf;

/// 参数解析命令参数
#[derive(Args, Debug)]
pub struct ParamsCommand {
    /// 参数文件路径（TOML）
    pub file: PathBuf,

    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

/// 解析结果
#[derive(Debug, Serialize)]
pub struct ResolvedParams {
    pub config: CruiseConfig,
    pub tuning: Option<LongitudinalTuning>,
}

impl ParamsCommand {
    /// 解析参数文件
    ///
    /// 与控制器不同，这里遇到错误直接报告，不回退到默认配置。
    pub fn resolve(&self) -> Result<ResolvedParams> {
        let params = TomlParams::new(&self.file);
        let config = CruiseConfig::from_params(&params)
            .with_context(|| format!("解析参数文件失败: {}", self.file.display()))?;

        Ok(ResolvedParams {
            tuning: config.longitudinal_tuning(),
            config,
        })
    }

    pub fn execute(&self) -> Result<()> {
        let resolved = self.resolve()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&resolved)?);
            return Ok(());
        }

        let config = &resolved.config;
        println!("📋 参数文件: {}", self.file.display());
        println!("  单位制: {:?}", config.unit_system);
        println!("  控制模式: {:?}", config.control_mode);
        println!("  PCM 速度: {}", config.pcm_speed);

        match &resolved.tuning {
            Some(tuning) => {
                println!("  纵向调参:");
                println!("    deadzone: {:?} -> {:?}", tuning.deadzone_bp, tuning.deadzone_v);
                println!("    kp: {:?} -> {:?}", tuning.kp_bp, tuning.kp_v);
                println!("    ki: {:?} -> {:?}", tuning.ki_bp, tuning.ki_v);
                println!("    stopping decel: {} m/s²", tuning.stopping_decel_rate);
                println!(
                    "    actuator delay: {} ~ {} s",
                    tuning.actuator_delay_lower_bound, tuning.actuator_delay_upper_bound
                );
            },
            None => println!("  纵向调参: 无（按键模拟模式）"),
        }

        Ok(())
    }
}

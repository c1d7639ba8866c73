//! simulate 命令
//!
//! 按场景文件离线运行控制器，打印每个周期发出的报文

use anyhow::Result;
use clap::Args;
use mazda_control::TomlParams;
use mazda_protocol::{MSG_CAM_LKAS, MSG_CRZ_BTNS};
use std::path::PathBuf;
use tracing::info;

use crate::scenario::{CycleRecord, Scenario, ScenarioRunner};

/// 场景仿真命令参数
#[derive(Args, Debug)]
pub struct SimulateCommand {
    /// 场景文件路径（JSON）
    pub scenario: PathBuf,

    /// 参数文件（TOML，覆盖场景内联参数）
    #[arg(short, long)]
    pub params: Option<PathBuf>,

    /// 同时打印每周期的转向帧
    #[arg(short, long)]
    pub verbose: bool,

    /// 以 JSON 输出全部周期
    #[arg(long)]
    pub json: bool,
}

impl SimulateCommand {
    /// 运行场景
    pub fn simulate(&self) -> Result<(Scenario, Vec<CycleRecord>)> {
        let scenario = Scenario::load(&self.scenario)?;

        let mut runner = match &self.params {
            Some(path) => {
                info!("Using params file {}", path.display());
                ScenarioRunner::new(TomlParams::new(path))
            },
            None => ScenarioRunner::new(scenario.memory_params()),
        };

        let records = runner.run(&scenario);
        Ok((scenario, records))
    }

    pub fn execute(&self) -> Result<()> {
        let (scenario, records) = self.simulate()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        println!("📜 场景: {}", scenario.name);
        if !scenario.description.is_empty() {
            println!("    {}", scenario.description);
        }
        println!("    {} 个周期", scenario.total_cycles());
        println!();

        let mut buttons = 0;
        for record in &records {
            for call in &record.frames {
                if call.name == MSG_CAM_LKAS && !self.verbose {
                    continue;
                }
                if call.name == MSG_CRZ_BTNS {
                    buttons += 1;
                }

                let signals: Vec<String> = call
                    .values
                    .iter()
                    .map(|(name, value)| format!("{}={}", name, value))
                    .collect();
                println!(
                    "[{:>6}] {:<13} steer={:<5} {}",
                    record.frame,
                    call.name,
                    record.steer_output_can,
                    signals.join(" ")
                );
            }
        }

        println!();
        println!("📊 模拟按键: {} 次", buttons);

        Ok(())
    }
}

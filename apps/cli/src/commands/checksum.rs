//! checksum 命令
//!
//! 计算一帧 `CAM_LKAS` 的信号值和校验和

use anyhow::{Result, ensure};
use clap::Args;
use mazda_control::STEER_MAX;
use mazda_protocol::{CamLkas, CanCommand, LkasCommand};

/// 校验和计算命令参数
#[derive(Args, Debug)]
pub struct ChecksumCommand {
    /// 转向扭矩（-800 ~ 800）
    #[arg(long, allow_hyphen_values = true)]
    pub steer: i32,

    /// 周期号（计数器取 frame mod 16）
    #[arg(long, default_value_t = 0)]
    pub frame: u64,

    /// 摄像头 BIT_1
    #[arg(long)]
    pub bit1: bool,

    /// 摄像头 ERR_BIT_1
    #[arg(long)]
    pub err1: bool,

    /// 摄像头 ERR_BIT_2
    #[arg(long)]
    pub err2: bool,

    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

impl ChecksumCommand {
    /// 构造转向帧
    pub fn command(&self) -> Result<LkasCommand> {
        ensure!(
            (-STEER_MAX..=STEER_MAX).contains(&self.steer),
            "转向扭矩超出范围: {} (允许 ±{})",
            self.steer,
            STEER_MAX
        );

        let cam = CamLkas {
            bit_1: self.bit1,
            err_bit_1: self.err1,
            err_bit_2: self.err2,
        };
        Ok(LkasCommand::new(self.steer, self.frame, cam))
    }

    pub fn execute(&self) -> Result<()> {
        let cmd = self.command()?;
        let signals = cmd.signals();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&signals)?);
            return Ok(());
        }

        println!("CAM_LKAS (frame {})", self.frame);
        for (name, value) in signals.iter() {
            println!("  {:<18} {}", name, value);
        }

        Ok(())
    }
}

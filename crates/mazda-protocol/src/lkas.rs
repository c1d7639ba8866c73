//! 转向指令帧（`CAM_LKAS`）
//!
//! 每个控制周期发送一次。平台在接受转向接管前会校验：
//! - 摄像头原帧中的三个标志位必须原样透传；
//! - 校验和必须与下列算法逐位一致。

use crate::{CanCommand, MSG_CAM_LKAS, SignalValues};

/// 转向值偏置：有符号转向值加 2048 后得到 12 位无符号量
pub const STEER_OFFSET: i32 = 2048;

/// 校验和初值
const CHECKSUM_BASE: i32 = 249;

/// 角度高位片段为 1 时的修正量
const ANGLE_HIGH_CORRECTION: i32 = 15;

/// 摄像头 `CAM_LKAS` 帧中需要透传的标志位
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CamLkas {
    #[cfg_attr(feature = "serde", serde(default))]
    pub bit_1: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub err_bit_1: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub err_bit_2: bool,
}

/// 转向角字段拆分后的三个片段
///
/// 部分旧硬件版本使用该字段。本平台恒为 0，但仍参与校验和计算。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleFragments {
    /// Byte 5
    pub high: i32,
    /// Byte 6（高低半字节交换）
    pub mid: i32,
    /// Byte 7
    pub low: i32,
}

impl AngleFragments {
    pub fn from_angle(steering_angle: i32) -> Self {
        let tmp = steering_angle + STEER_OFFSET;
        let mid = (tmp & 0x3FF) >> 2;
        Self {
            high: tmp >> 10,
            mid: (mid >> 4) | ((mid & 0xF) << 4),
            low: (tmp & 0x3) << 2,
        }
    }
}

/// 计算 `CAM_LKAS` 校验和
///
/// 结果总在 `0..=255` 内。负值先加 256（小于 -256 时加 512），再取模。
pub fn lkas_checksum(cmd: &LkasCommand) -> u8 {
    let tmp = cmd.apply_steer + STEER_OFFSET;
    let lo = tmp & 0xFF;
    let hi = tmp >> 8;
    let angle = AngleFragments::from_angle(cmd.steering_angle);

    // Byte 1-4
    let mut csum = CHECKSUM_BASE
        - i32::from(cmd.counter)
        - hi
        - lo
        - (i32::from(cmd.line_not_visible) << 3)
        - i32::from(cmd.cam.err_bit_1)
        - (i32::from(cmd.ldw) << 7)
        - (i32::from(cmd.cam.err_bit_2) << 4)
        - (i32::from(cmd.cam.bit_1) << 5);

    // Byte 5-7
    csum = csum - angle.high - angle.mid - angle.low - i32::from(cmd.angle_enabled);

    if angle.high == 1 {
        csum += ANGLE_HIGH_CORRECTION;
    }

    if csum < 0 {
        if csum < -256 {
            csum += 512;
        } else {
            csum += 256;
        }
    }

    // 值域 0..=255，转换不会截断
    csum.rem_euclid(256) as u8
}

/// 转向指令帧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LkasCommand {
    /// 限幅后的转向扭矩（±STEER_MAX）
    pub apply_steer: i32,
    /// 滚动计数器（周期 mod 16）
    pub counter: u8,
    /// 摄像头透传位
    pub cam: CamLkas,
    pub line_not_visible: bool,
    pub ldw: bool,
    /// 转向角，本平台固定为 0
    pub steering_angle: i32,
    pub angle_enabled: bool,
}

impl LkasCommand {
    /// 创建本周期的转向指令
    pub fn new(apply_steer: i32, frame: u64, cam: CamLkas) -> Self {
        Self {
            apply_steer,
            counter: (frame % 16) as u8,
            cam,
            line_not_visible: false,
            ldw: false,
            steering_angle: 0,
            angle_enabled: false,
        }
    }

    /// 校验和
    pub fn checksum(&self) -> u8 {
        lkas_checksum(self)
    }
}

impl CanCommand for LkasCommand {
    const NAME: &'static str = MSG_CAM_LKAS;

    fn signals(&self) -> SignalValues {
        let mut values = SignalValues::new();
        values.insert("LKAS_REQUEST", self.apply_steer);
        values.insert("CTR", self.counter);
        values.insert("ERR_BIT_1", self.cam.err_bit_1);
        values.insert("LINE_NOT_VISIBLE", self.line_not_visible);
        values.insert("LDW", self.ldw);
        values.insert("BIT_1", self.cam.bit_1);
        values.insert("ERR_BIT_2", self.cam.err_bit_2);
        values.insert("STEERING_ANGLE", self.steering_angle);
        values.insert("ANGLE_ENABLED", self.angle_enabled);
        values.insert("CHKSUM", self.checksum());
        values
    }
}

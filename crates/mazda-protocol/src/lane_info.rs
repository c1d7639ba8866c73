//! 车道/告警帧（`CAM_LANEINFO`）
//!
//! 透传摄像头原帧的车道线信息，并叠加"请握住方向盘"告警位。

use crate::{CanCommand, MSG_CAM_LANEINFO, SignalValues};

/// 三位告警全部置位
const HANDS_WARN_ALL: i64 = 0b111;

/// 摄像头 `CAM_LANEINFO` 帧中需要透传的字段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CamLaneInfo {
    pub line_visible: u8,
    pub line_not_visible: u8,
    pub lane_lines: u8,
    pub bit1: u8,
    pub bit2: u8,
    pub bit3: u8,
    pub no_err_bit: u8,
    pub s1: u8,
    pub s1_hbeam: u8,
}

/// 车道/告警帧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneInfoCommand {
    pub cam: CamLaneInfo,
    /// 车道偏离告警
    ///
    /// 左右方向与 `LDW_WARN_LL`/`LDW_WARN_RL` 的对应关系尚未确认（右侧可用、左侧无效），
    /// 目前两个字段都固定发送 0，本标志不映射到报文。
    pub ldw: bool,
    /// 需要驾驶员接管方向盘
    pub steer_required: bool,
}

impl LaneInfoCommand {
    pub fn new(cam: CamLaneInfo, ldw: bool, steer_required: bool) -> Self {
        Self {
            cam,
            ldw,
            steer_required,
        }
    }
}

impl CanCommand for LaneInfoCommand {
    const NAME: &'static str = MSG_CAM_LANEINFO;

    fn signals(&self) -> SignalValues {
        let mut values = SignalValues::new();
        values.insert("LINE_VISIBLE", self.cam.line_visible);
        values.insert("LINE_NOT_VISIBLE", self.cam.line_not_visible);
        values.insert("LANE_LINES", self.cam.lane_lines);
        values.insert("BIT1", self.cam.bit1);
        values.insert("BIT2", self.cam.bit2);
        values.insert("BIT3", self.cam.bit3);
        values.insert("NO_ERR_BIT", self.cam.no_err_bit);
        values.insert("S1", self.cam.s1);
        values.insert("S1_HBEAM", self.cam.s1_hbeam);

        values.insert(
            "HANDS_WARN_3_BITS",
            if self.steer_required { HANDS_WARN_ALL } else { 0 },
        );
        values.insert("HANDS_ON_STEER_WARN", self.steer_required);
        values.insert("HANDS_ON_STEER_WARN_2", self.steer_required);

        values.insert("LDW_WARN_LL", 0);
        values.insert("LDW_WARN_RL", 0);
        values
    }
}

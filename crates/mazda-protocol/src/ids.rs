//! 报文名称与 CAN ID 常量定义
//!
//! 只列出控制器会发送的三帧报文。

use crate::ProtocolError;

/// 控制器发送报文使用的总线
pub const BUS_PT: u8 = 0;

// ============================================================================
// 报文名称
// ============================================================================

/// 转向指令帧（摄像头 LKAS 帧）
pub const MSG_CAM_LKAS: &str = "CAM_LKAS";

/// 车道/告警帧
pub const MSG_CAM_LANEINFO: &str = "CAM_LANEINFO";

/// 巡航按键帧
pub const MSG_CRZ_BTNS: &str = "CRZ_BTNS";

// ============================================================================
// CAN ID
// ============================================================================

pub const ID_CAM_LKAS: u32 = 0x243;
pub const ID_CAM_LANEINFO: u32 = 0x440;
pub const ID_CRZ_BTNS: u32 = 0x09D;

/// 发送报文分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageKind {
    /// 转向指令（每周期）
    Lkas,
    /// 车道/告警（每 50 周期）
    LaneInfo,
    /// 巡航按键（按仲裁节奏）
    CruiseButtons,
}

impl MessageKind {
    /// 报文名
    pub fn name(self) -> &'static str {
        match self {
            MessageKind::Lkas => MSG_CAM_LKAS,
            MessageKind::LaneInfo => MSG_CAM_LANEINFO,
            MessageKind::CruiseButtons => MSG_CRZ_BTNS,
        }
    }

    /// CAN ID
    pub fn address(self) -> u32 {
        match self {
            MessageKind::Lkas => ID_CAM_LKAS,
            MessageKind::LaneInfo => ID_CAM_LANEINFO,
            MessageKind::CruiseButtons => ID_CRZ_BTNS,
        }
    }

    /// 根据报文名查找
    pub fn from_name(name: &str) -> Result<Self, ProtocolError> {
        match name {
            MSG_CAM_LKAS => Ok(MessageKind::Lkas),
            MSG_CAM_LANEINFO => Ok(MessageKind::LaneInfo),
            MSG_CRZ_BTNS => Ok(MessageKind::CruiseButtons),
            _ => Err(ProtocolError::UnknownMessage {
                name: name.to_string(),
            }),
        }
    }
}

//! 巡航按键模拟帧（`CRZ_BTNS`）
//!
//! 通过发送与实体按键相同的报文来模拟按键按下。
//! 每个按键位都带一个取反位（`*_INV`），接收端用它做总线完整性校验。

use crate::{CanCommand, MSG_CRZ_BTNS, ProtocolError, SignalValues};
use num_enum::IntoPrimitive;

/// "无按键" 的原始编码
pub const BUTTON_NONE: u8 = 0;

/// 巡航按键
///
/// 编码与车身按键状态信号一致，`0` 表示无按键（见 [`BUTTON_NONE`]），
/// 在 Rust 侧用 `Option<CruiseButton>` 表达。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum CruiseButton {
    /// SET+，设定速度加一档
    SetPlus = 1,
    /// SET-，设定速度减一档
    SetMinus = 2,
    /// RES，恢复/激活巡航
    Resume = 3,
    /// CANCEL，取消巡航
    Cancel = 4,
}

impl TryFrom<u8> for CruiseButton {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CruiseButton::SetPlus),
            2 => Ok(CruiseButton::SetMinus),
            3 => Ok(CruiseButton::Resume),
            4 => Ok(CruiseButton::Cancel),
            _ => Err(ProtocolError::InvalidValue {
                field: "CruiseButton".to_string(),
                value,
            }),
        }
    }
}

impl CruiseButton {
    /// 解码按键状态信号，`0` 解码为 `None`
    pub fn from_raw(value: u8) -> Result<Option<Self>, ProtocolError> {
        if value == BUTTON_NONE {
            return Ok(None);
        }
        Self::try_from(value).map(Some)
    }
}

/// 巡航按键模拟帧
///
/// 由单个按键构造，保证四个按键位中恰好一个为 1。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CruiseButtonsCommand {
    pub button: CruiseButton,
    /// 滚动计数器（输入计数器 + 1，mod 16）
    pub counter: u8,
}

impl CruiseButtonsCommand {
    /// 创建按键帧
    ///
    /// `counter` 为总线上最近一帧 `CRZ_BTNS` 的计数器，或由周期推导出的计数器。
    pub fn new(button: CruiseButton, counter: u64) -> Self {
        Self {
            button,
            counter: ((counter % 16 + 1) % 16) as u8,
        }
    }

    /// 某个按键位是否按下
    pub fn pressed(&self, button: CruiseButton) -> bool {
        self.button == button
    }
}

impl CanCommand for CruiseButtonsCommand {
    const NAME: &'static str = MSG_CRZ_BTNS;

    fn signals(&self) -> SignalValues {
        let can = self.pressed(CruiseButton::Cancel);
        let res = self.pressed(CruiseButton::Resume);
        let inc = self.pressed(CruiseButton::SetPlus);
        let dec = self.pressed(CruiseButton::SetMinus);

        let mut values = SignalValues::new();
        values.insert("CAN_OFF", can);
        values.insert("CAN_OFF_INV", !can);
        values.insert("SET_P", inc);
        values.insert("SET_P_INV", !inc);
        values.insert("RES", res);
        values.insert("RES_INV", !res);
        values.insert("SET_M", dec);
        values.insert("SET_M_INV", !dec);

        // 未模拟的按键：保持松开
        values.insert("DISTANCE_LESS", 0);
        values.insert("DISTANCE_LESS_INV", 1);
        values.insert("DISTANCE_MORE", 0);
        values.insert("DISTANCE_MORE_INV", 1);
        values.insert("MODE_X", 0);
        values.insert("MODE_X_INV", 1);
        values.insert("MODE_Y", 0);
        values.insert("MODE_Y_INV", 1);

        // 平台要求的固定位
        values.insert("BIT1", 1);
        values.insert("BIT2", 1);
        values.insert("BIT3", 1);
        values.insert("CTR", self.counter);
        values
    }
}

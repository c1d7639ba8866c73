//! # Mazda Protocol
//!
//! Mazda GEN1 平台 CAN 总线控制帧定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `ids`: 报文名称与 CAN ID 常量
//! - `lkas`: 转向指令帧（`CAM_LKAS`）及校验和
//! - `buttons`: 巡航按键模拟帧（`CRZ_BTNS`）
//! - `lane_info`: 车道/告警帧（`CAM_LANEINFO`）
//! - `packer`: 打包器实现（录制用）
//!
//! ## 打包边界
//!
//! 本 crate 只负责计算每个信号的取值（包括校验和），不负责按 DBC 做位级打包。
//! 位级打包由外部的 [`CanPacker`] 实现完成：
//!
//! ```text
//! LkasCommand / CruiseButtonsCommand / LaneInfoCommand (强类型)
//!     ↓ CanCommand::signals()
//! SignalValues (信号名 → 整数值)
//!     ↓ CanPacker::make_can_msg()
//! CanMessage (原始字节)
//! ```

pub mod buttons;
pub mod ids;
pub mod lane_info;
pub mod lkas;
pub mod packer;

// 重新导出常用类型
pub use buttons::*;
pub use ids::*;
pub use lane_info::*;
pub use lkas::*;
pub use packer::{PackedCall, RecordingPacker};

use std::collections::BTreeMap;
use thiserror::Error;

/// 协议错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown message: {name}")]
    UnknownMessage { name: String },

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: String, value: u8 },
}

/// 一帧报文的信号取值表
///
/// 信号名来自外部信号数据库（DBC），值统一为整数。
/// 内部使用 `BTreeMap`，迭代顺序按信号名排序，便于日志和测试对比。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SignalValues(BTreeMap<&'static str, i64>);

impl SignalValues {
    /// 创建空表
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// 写入信号值（同名信号覆盖）
    pub fn insert(&mut self, name: &'static str, value: impl Into<i64>) {
        self.0.insert(name, value.into());
    }

    /// 读取信号值
    pub fn get(&self, name: &str) -> Option<i64> {
        self.0.get(name).copied()
    }

    /// 信号数量
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 按信号名顺序迭代
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, i64)> + '_ {
        self.0.iter().map(|(name, value)| (*name, *value))
    }
}

impl FromIterator<(&'static str, i64)> for SignalValues {
    fn from_iter<I: IntoIterator<Item = (&'static str, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// 打包后的 CAN 报文
///
/// 由 [`CanPacker`] 生成，按报文名寻址。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CanMessage {
    /// 报文名（DBC 中的名称）
    pub name: &'static str,

    /// CAN ID
    pub address: u32,

    /// 总线编号
    pub bus: u8,

    /// 打包后的数据
    pub data: Vec<u8>,
}

/// 帧打包服务
///
/// 按外部信号数据库把信号值表打包为原始字节。本 crate 不实现位级打包。
pub trait CanPacker {
    /// 打包一帧报文
    fn make_can_msg(&self, message: &'static str, bus: u8, values: &SignalValues) -> CanMessage;
}

impl<P: CanPacker + ?Sized> CanPacker for &P {
    fn make_can_msg(&self, message: &'static str, bus: u8, values: &SignalValues) -> CanMessage {
        (**self).make_can_msg(message, bus, values)
    }
}

/// 强类型控制帧
///
/// 每种报文一个结构体，只在打包边界处转换为 [`SignalValues`]。
pub trait CanCommand {
    /// 报文名
    const NAME: &'static str;

    /// 生成信号值表
    fn signals(&self) -> SignalValues;

    /// 通过打包器生成报文
    fn pack<P: CanPacker + ?Sized>(&self, packer: &P, bus: u8) -> CanMessage {
        packer.make_can_msg(Self::NAME, bus, &self.signals())
    }
}

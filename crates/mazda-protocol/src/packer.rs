//! 录制用打包器
//!
//! 不做位级打包，只记录每次调用的报文名、总线和信号值。
//! 用于离线仿真和测试，真实打包由外部 DBC 打包器完成。

use crate::{CanMessage, CanPacker, MessageKind, SignalValues};
use std::cell::RefCell;

/// 一次打包调用
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PackedCall {
    pub name: &'static str,
    pub bus: u8,
    pub values: SignalValues,
}

/// 录制用打包器
///
/// 单线程使用（内部 `RefCell`）。返回的 [`CanMessage`] 数据为空。
#[derive(Debug, Default)]
pub struct RecordingPacker {
    calls: RefCell<Vec<PackedCall>>,
}

impl RecordingPacker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已记录的调用（拷贝）
    pub fn calls(&self) -> Vec<PackedCall> {
        self.calls.borrow().clone()
    }

    /// 取出并清空已记录的调用
    pub fn take_calls(&self) -> Vec<PackedCall> {
        self.calls.take()
    }
}

impl CanPacker for RecordingPacker {
    fn make_can_msg(&self, message: &'static str, bus: u8, values: &SignalValues) -> CanMessage {
        self.calls.borrow_mut().push(PackedCall {
            name: message,
            bus,
            values: values.clone(),
        });

        // 未知报文名的 ID 记为 0，录制本身不失败
        let address = MessageKind::from_name(message)
            .map(MessageKind::address)
            .unwrap_or(0);

        CanMessage {
            name: message,
            address,
            bus,
            data: Vec::new(),
        }
    }
}

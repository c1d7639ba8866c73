//! # Mazda Control
//!
//! 转向指令排序与巡航按键仲裁（无硬件依赖）
//!
//! 本 crate 位于规划层与 CAN 打包器之间：每个控制周期接收一次
//! [`ControlIntent`] 和 [`VehicleState`]，输出本周期需要发送的控制帧。
//!
//! ## 模块
//!
//! - `units`: 单位制与车速换算
//! - `params`: 参数存储接口及实现
//! - `config`: 控制器配置与控制模式
//! - `state`: 车辆状态快照与控制意图
//! - `torque`: 转向扭矩限幅
//! - `arbiter`: 巡航按键仲裁
//! - `controller`: 周期控制器
//!
//! ## 快速开始
//!
//! ```
//! use mazda_control::{CarControllerBuilder, ControlIntent, VehicleState};
//! use mazda_protocol::RecordingPacker;
//!
//! let mut controller = CarControllerBuilder::new().build();
//! let packer = RecordingPacker::new();
//!
//! let intent = ControlIntent { lat_active: true, steer: 0.5, ..Default::default() };
//! let state = VehicleState::default();
//!
//! let (actuators, frames) = controller.update(&intent, &state, &packer);
//! assert_eq!(actuators.steer_output_can, 10);
//! assert_eq!(frames.len(), 2);
//! ```

pub mod arbiter;
mod builder;
pub mod config;
pub mod controller;
mod error;
pub mod params;
pub mod state;
pub mod torque;
pub mod units;

pub use arbiter::CruiseArbiter;
pub use builder::CarControllerBuilder;
pub use config::{ControlMode, CruiseConfig, LongitudinalTuning};
pub use controller::{
    ActuatorsOutput, CarController, ControlOutput, MessageBuffer, OutgoingMessage,
};
pub use error::ParamError;
pub use params::{
    KEY_CONTROL_MODE, KEY_IS_METRIC, KEY_PCM_SPEED, KEY_SPEED_FROM_PCM, MemoryParams,
    ParamStore, ParamValue, TomlParams,
};
pub use state::{ButtonEvent, ButtonType, ControlIntent, VehicleState, VisualAlert};
pub use torque::{DriverTorqueLimiter, STEER_MAX, SteerLimits, SteerTorqueLimiter};
pub use units::UnitSystem;

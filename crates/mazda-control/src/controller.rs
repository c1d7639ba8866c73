//! 周期控制器
//!
//! [`CarController`] 每个控制周期调用一次，输出本周期需要发送的报文：
//!
//! ```text
//! 参数存储 ──(每 50 周期)──> CruiseConfig
//! ControlIntent + VehicleState
//!     ├─> 扭矩限幅 ──> LkasCommand（每周期）
//!     ├─> CruiseArbiter ──> CruiseButtonsCommand（至多一个）
//!     └─> 视觉告警 ──> LaneInfoCommand（每 50 周期）
//! ```
//!
//! 输出顺序固定：按键帧、告警帧、转向帧。

use crate::arbiter::CruiseArbiter;
use crate::config::CruiseConfig;
use crate::params::ParamStore;
use crate::state::{ControlIntent, VehicleState, VisualAlert};
use crate::torque::SteerTorqueLimiter;
use mazda_protocol::{
    BUS_PT, CanCommand, CanMessage, CanPacker, CruiseButtonsCommand, LaneInfoCommand,
    LkasCommand, MessageKind,
};
use smallvec::SmallVec;
use tracing::{info, trace, warn};

/// 配置刷新节奏（周期）
pub const CONFIG_REFRESH_CADENCE: u64 = 50;

/// 告警帧发送节奏（周期）
pub const ALERT_CADENCE: u64 = 50;

/// 单周期待发送报文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutgoingMessage {
    CruiseButtons(CruiseButtonsCommand),
    LaneInfo(LaneInfoCommand),
    Lkas(LkasCommand),
}

impl OutgoingMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::CruiseButtons(_) => MessageKind::CruiseButtons,
            Self::LaneInfo(_) => MessageKind::LaneInfo,
            Self::Lkas(_) => MessageKind::Lkas,
        }
    }

    /// 通过打包器生成报文
    pub fn pack<P: CanPacker + ?Sized>(&self, packer: &P, bus: u8) -> CanMessage {
        match self {
            Self::CruiseButtons(cmd) => cmd.pack(packer, bus),
            Self::LaneInfo(cmd) => cmd.pack(packer, bus),
            Self::Lkas(cmd) => cmd.pack(packer, bus),
        }
    }
}

/// 单周期报文缓冲
///
/// 每周期最多 3 帧，预留 4 个位置，控制循环中不做堆分配。
pub type MessageBuffer = SmallVec<[OutgoingMessage; 4]>;

/// 实际施加的执行量
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActuatorsOutput {
    /// 相对 STEER_MAX 的比例
    pub steer: f64,
    /// 报文中的原始扭矩值
    pub steer_output_can: i32,
}

/// 单周期输出
#[derive(Debug, Clone, PartialEq)]
pub struct ControlOutput {
    /// 本次输出对应的周期号
    pub frame: u64,
    pub actuators: ActuatorsOutput,
    pub messages: MessageBuffer,
}

impl ControlOutput {
    /// 按输出顺序打包所有报文（总线 0）
    pub fn pack<P: CanPacker + ?Sized>(&self, packer: &P) -> Vec<CanMessage> {
        self.messages
            .iter()
            .map(|msg| msg.pack(packer, BUS_PT))
            .collect()
    }

    /// 本周期的按键帧
    pub fn button(&self) -> Option<&CruiseButtonsCommand> {
        self.messages.iter().find_map(|msg| match msg {
            OutgoingMessage::CruiseButtons(cmd) => Some(cmd),
            _ => None,
        })
    }

    /// 本周期的告警帧
    pub fn lane_info(&self) -> Option<&LaneInfoCommand> {
        self.messages.iter().find_map(|msg| match msg {
            OutgoingMessage::LaneInfo(cmd) => Some(cmd),
            _ => None,
        })
    }

    /// 本周期的转向帧
    pub fn lkas(&self) -> Option<&LkasCommand> {
        self.messages.iter().find_map(|msg| match msg {
            OutgoingMessage::Lkas(cmd) => Some(cmd),
            _ => None,
        })
    }
}

/// 周期控制器
///
/// 持有除输入快照外的全部跨周期状态。通过 [`crate::CarControllerBuilder`] 构造。
pub struct CarController {
    frame: u64,
    config: CruiseConfig,
    params: Box<dyn ParamStore>,
    limiter: Box<dyn SteerTorqueLimiter>,
    arbiter: CruiseArbiter,
    apply_steer_last: i32,
}

impl CarController {
    pub(crate) fn new(
        config: CruiseConfig,
        params: Box<dyn ParamStore>,
        limiter: Box<dyn SteerTorqueLimiter>,
    ) -> Self {
        Self {
            frame: 0,
            config,
            params,
            limiter,
            arbiter: CruiseArbiter::new(),
            apply_steer_last: 0,
        }
    }

    /// 下一次调用的周期号
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// 当前生效的配置
    pub fn config(&self) -> &CruiseConfig {
        &self.config
    }

    /// 上一周期实际施加的扭矩
    pub fn apply_steer_last(&self) -> i32 {
        self.apply_steer_last
    }

    pub fn arbiter(&self) -> &CruiseArbiter {
        &self.arbiter
    }

    /// 清除激活锁存，允许按键模式再次发送激活用的 RES
    pub fn reset_activation_latch(&mut self) {
        self.arbiter.reset_activation_latch();
    }

    /// 从参数存储重新读取配置
    ///
    /// 读取失败时退回默认配置，不向调用方传播错误。
    pub fn refresh_config(&mut self) {
        let config = match CruiseConfig::from_params(self.params.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to read controller params, using defaults: {}", e);
                CruiseConfig::default()
            },
        };

        if config != self.config {
            info!("Controller config changed: {:?} -> {:?}", self.config, config);
            self.config = config;
        }
    }

    /// 执行一个控制周期，返回强类型报文
    pub fn step(&mut self, intent: &ControlIntent, state: &VehicleState) -> ControlOutput {
        let frame = self.frame;

        if frame % CONFIG_REFRESH_CADENCE == 0 {
            self.refresh_config();
        }

        let mut messages = MessageBuffer::new();
        let limits = self.limiter.limits();

        let apply_steer = if intent.lat_active {
            let new_steer = (intent.steer * f64::from(limits.max)).round_ties_even() as i32;
            self.limiter
                .apply(new_steer, self.apply_steer_last, state.steering_torque)
        } else {
            0
        };
        trace!(frame, apply_steer, "steer");

        if let Some(cmd) = self.arbiter.arbitrate(frame, &self.config, intent, state) {
            messages.push(OutgoingMessage::CruiseButtons(cmd));
        }

        self.apply_steer_last = apply_steer;

        if frame % ALERT_CADENCE == 0 {
            let ldw = intent.visual_alert == VisualAlert::Ldw;
            let steer_required =
                intent.visual_alert == VisualAlert::SteerRequired && state.lkas_allowed_speed;
            messages.push(OutgoingMessage::LaneInfo(LaneInfoCommand::new(
                state.cam_laneinfo,
                ldw,
                steer_required,
            )));
        }

        messages.push(OutgoingMessage::Lkas(LkasCommand::new(
            apply_steer,
            frame,
            state.cam_lkas,
        )));

        let actuators = ActuatorsOutput {
            steer: f64::from(apply_steer) / f64::from(limits.max),
            steer_output_can: apply_steer,
        };

        self.frame += 1;

        ControlOutput {
            frame,
            actuators,
            messages,
        }
    }

    /// 执行一个控制周期，并通过打包器生成报文
    pub fn update<P: CanPacker + ?Sized>(
        &mut self,
        intent: &ControlIntent,
        state: &VehicleState,
        packer: &P,
    ) -> (ActuatorsOutput, Vec<CanMessage>) {
        let output = self.step(intent, state);
        (output.actuators, output.pack(packer))
    }
}

impl std::fmt::Debug for CarController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarController")
            .field("frame", &self.frame)
            .field("config", &self.config)
            .field("arbiter", &self.arbiter)
            .field("apply_steer_last", &self.apply_steer_last)
            .finish_non_exhaustive()
    }
}

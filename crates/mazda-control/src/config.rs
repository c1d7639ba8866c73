//! 控制器配置
//!
//! 配置在构造时注入 `CarController`，之后每 50 周期从参数存储显式刷新一次。
//! 读取失败时使用 [`CruiseConfig::default`]（英制、原车速度通道关闭）。

use crate::error::ParamError;
use crate::params::{
    KEY_CONTROL_MODE, KEY_IS_METRIC, KEY_PCM_SPEED, KEY_SPEED_FROM_PCM, ParamStore,
};
use crate::units::UnitSystem;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// `SpeedFromPCM` 中表示"速度来自原车 PCM"的取值
pub const SPEED_FROM_PCM_NATIVE: i64 = 1;

/// 配置解析读取的参数键
pub const CONFIG_KEYS: [&str; 4] = [
    KEY_SPEED_FROM_PCM,
    KEY_IS_METRIC,
    KEY_CONTROL_MODE,
    KEY_PCM_SPEED,
];

/// 巡航速度控制策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// 纵向控制由本系统规划，通过 SET+/SET- 让原车 ACC 跟随目标速度（每 10 周期）
    #[default]
    NativeLongitudinal,
    /// 仅模拟按键：激活巡航、恢复，必要时调整设定速度（每 20 周期）
    ButtonSimulated,
}

impl ControlMode {
    /// 由 `SpeedFromPCM` 选择器推导
    pub fn from_selector(speed_from_pcm: i64) -> Self {
        if speed_from_pcm == SPEED_FROM_PCM_NATIVE {
            Self::ButtonSimulated
        } else {
            Self::NativeLongitudinal
        }
    }

    /// 仲裁节奏（周期数）
    pub fn cadence(self) -> u64 {
        match self {
            Self::NativeLongitudinal => 10,
            Self::ButtonSimulated => 20,
        }
    }
}

impl FromStr for ControlMode {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native_longitudinal" => Ok(Self::NativeLongitudinal),
            "button_simulated" => Ok(Self::ButtonSimulated),
            _ => Err(ParamError::InvalidValue {
                key: KEY_CONTROL_MODE.to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// 控制器配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CruiseConfig {
    pub unit_system: UnitSystem,
    pub control_mode: ControlMode,
    /// 设定速度由原车 PCM 决定；为 true 时按键模式不再发送 SET+/SET-
    pub pcm_speed: bool,
}

impl CruiseConfig {
    pub fn new(unit_system: UnitSystem, control_mode: ControlMode, pcm_speed: bool) -> Self {
        Self {
            unit_system,
            control_mode,
            pcm_speed,
        }
    }

    /// 从参数存储解析配置
    ///
    /// - `SpeedFromPCM`：缺省为 0；`1` 表示按键模式且速度来自 PCM
    /// - `ControlMode` / `PcmSpeed`：存在时覆盖选择器推导的结果
    /// - `IsMetric`：缺省为英制
    ///
    /// 所有键取自同一份快照。
    pub fn from_params(params: &dyn ParamStore) -> Result<Self, ParamError> {
        let params = params.snapshot(&CONFIG_KEYS)?;
        let selector = params.get_int(KEY_SPEED_FROM_PCM)?.unwrap_or(0);

        let control_mode = match params.get_str(KEY_CONTROL_MODE)? {
            Some(mode) => mode.parse()?,
            None => ControlMode::from_selector(selector),
        };
        let pcm_speed = params
            .get_bool(KEY_PCM_SPEED)?
            .unwrap_or(selector == SPEED_FROM_PCM_NATIVE);
        let unit_system =
            UnitSystem::from_is_metric(params.get_bool(KEY_IS_METRIC)?.unwrap_or(false));

        Ok(Self {
            unit_system,
            control_mode,
            pcm_speed,
        })
    }

    /// 纵向控制调参（仅 NativeLongitudinal 模式需要）
    pub fn longitudinal_tuning(&self) -> Option<LongitudinalTuning> {
        LongitudinalTuning::for_mode(self.control_mode)
    }
}

/// 纵向 PID 调参
///
/// 在 NativeLongitudinal 模式下由车辆接口层启用纵向控制时使用。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongitudinalTuning {
    pub deadzone_bp: Vec<f64>,
    /// 允许约 2 mph 的速度误差
    pub deadzone_v: Vec<f64>,
    /// m/s²
    pub stopping_decel_rate: f64,
    /// s
    pub actuator_delay_lower_bound: f64,
    /// s
    pub actuator_delay_upper_bound: f64,
    /// 8.94 m/s == 20 mph
    pub kp_bp: Vec<f64>,
    /// 低速段为 0：该速度以下无法巡航
    pub kp_v: Vec<f64>,
    pub ki_bp: Vec<f64>,
    pub ki_v: Vec<f64>,
}

impl LongitudinalTuning {
    pub fn for_mode(mode: ControlMode) -> Option<Self> {
        match mode {
            ControlMode::NativeLongitudinal => Some(Self {
                deadzone_bp: vec![0.0],
                deadzone_v: vec![0.9],
                stopping_decel_rate: 4.5,
                actuator_delay_lower_bound: 1.0,
                actuator_delay_upper_bound: 2.0,
                kp_bp: vec![8.94, 7.2, 28.0],
                kp_v: vec![0.0, 4.0, 2.0],
                ki_bp: vec![0.0],
                ki_v: vec![0.1],
            }),
            ControlMode::ButtonSimulated => None,
        }
    }
}

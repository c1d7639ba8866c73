//! 控制器输入：车辆状态快照与控制意图
//!
//! 可选字段在快照边界处统一解析（见 [`VehicleState::cruise_button`]、
//! [`VehicleState::distance_pressed`]），控制逻辑只看到解析后的结果。

use mazda_protocol::{CamLaneInfo, CamLkas, CruiseButton};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// 通用按键事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonType {
    #[default]
    Unknown,
    LeftBlinker,
    RightBlinker,
    AccelCruise,
    DecelCruise,
    Cancel,
    SetCruise,
    ResumeCruise,
    GapAdjustCruise,
    MainCruise,
    Lkas,
}

impl ButtonType {
    /// 对应的巡航按键（非巡航按键返回 `None`）
    pub fn cruise_button(self) -> Option<CruiseButton> {
        match self {
            ButtonType::AccelCruise => Some(CruiseButton::SetPlus),
            ButtonType::DecelCruise => Some(CruiseButton::SetMinus),
            ButtonType::ResumeCruise => Some(CruiseButton::Resume),
            ButtonType::Cancel => Some(CruiseButton::Cancel),
            _ => None,
        }
    }
}

/// 按键事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonEvent {
    #[serde(rename = "type")]
    pub kind: ButtonType,
    pub pressed: bool,
}

impl ButtonEvent {
    pub fn new(kind: ButtonType, pressed: bool) -> Self {
        Self { kind, pressed }
    }
}

/// 车辆状态快照（每周期只读）
///
/// 速度单位统一为 m/s。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleState {
    /// 驾驶员施加的转向扭矩
    pub steering_torque: f64,
    pub brake_pressed: bool,
    pub gas_pressed: bool,
    /// 原车巡航已激活
    pub cruise_enabled: bool,
    /// 原车巡航设定速度
    pub cruise_speed: f64,
    /// 当前车速
    pub v_ego: f64,
    /// 总线上最近一帧 `CRZ_BTNS` 的计数器
    pub crz_btns_counter: u8,
    pub cam_lkas: CamLkas,
    pub cam_laneinfo: CamLaneInfo,
    /// 车速满足 LKAS 工作条件
    pub lkas_allowed_speed: bool,
    /// 原车巡航按键状态（原始编码，0 表示无按键）
    ///
    /// 部分车型解析器不提供该字段，此时从 `button_events` 推断。
    pub cruise_buttons: Option<u8>,
    /// 车距按键状态，缺省视为未按下
    pub distance_button: Option<bool>,
    pub button_events: Vec<ButtonEvent>,
}

impl VehicleState {
    /// 驾驶员本周期按下的巡航按键
    ///
    /// 优先使用原车按键状态；缺失或编码无法识别时，取 `button_events` 中第一个巡航按键。
    pub fn cruise_button(&self) -> Option<CruiseButton> {
        if let Some(raw) = self.cruise_buttons {
            match CruiseButton::from_raw(raw) {
                Ok(button) => return button,
                Err(e) => warn!("Unrecognized cruise button state, using button events: {}", e),
            }
        }

        self.button_events
            .iter()
            .find_map(|event| event.kind.cruise_button())
    }

    /// 车距按键是否按下
    pub fn distance_pressed(&self) -> bool {
        self.distance_button.unwrap_or(false)
    }

    /// 驾驶员正在操作巡航或车距按键
    pub fn driver_operating_buttons(&self) -> bool {
        self.cruise_button().is_some() || self.distance_pressed()
    }
}

/// 仪表视觉告警
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualAlert {
    #[default]
    None,
    Fcw,
    SteerRequired,
    BrakePressed,
    WrongGear,
    SeatbeltUnbuckled,
    SpeedTooHigh,
    Ldw,
}

/// 控制意图（规划层输出）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlIntent {
    /// 纵向控制已启用
    pub enabled: bool,
    /// 横向控制激活
    pub lat_active: bool,
    /// 期望转向执行量（-1.0 ~ 1.0，相对 STEER_MAX）
    pub steer: f64,
    /// 期望纵向加速度（m/s²，本控制器不直接使用）
    pub accel: f64,
    /// 请求取消原车巡航
    pub cancel: bool,
    /// 请求恢复巡航（停车后起步）
    pub resume: bool,
    /// 仪表设定速度（m/s）
    pub set_speed: f64,
    /// 前车可见
    pub lead_visible: bool,
    pub visual_alert: VisualAlert,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_cruise_buttons_take_priority() {
        let state = VehicleState {
            cruise_buttons: Some(2),
            button_events: vec![ButtonEvent::new(ButtonType::AccelCruise, true)],
            ..Default::default()
        };
        assert_eq!(state.cruise_button(), Some(CruiseButton::SetMinus));
    }

    #[test]
    fn test_native_none_does_not_fall_back() {
        let state = VehicleState {
            cruise_buttons: Some(0),
            button_events: vec![ButtonEvent::new(ButtonType::AccelCruise, true)],
            ..Default::default()
        };
        assert_eq!(state.cruise_button(), None);
    }

    #[test]
    fn test_missing_cruise_buttons_infers_from_events() {
        let state = VehicleState {
            cruise_buttons: None,
            button_events: vec![
                ButtonEvent::new(ButtonType::LeftBlinker, true),
                ButtonEvent::new(ButtonType::ResumeCruise, true),
                ButtonEvent::new(ButtonType::Cancel, true),
            ],
            ..Default::default()
        };
        assert_eq!(state.cruise_button(), Some(CruiseButton::Resume));
    }

    #[test]
    fn test_unrecognized_code_falls_back_to_events() {
        let state = VehicleState {
            cruise_buttons: Some(9),
            button_events: vec![ButtonEvent::new(ButtonType::DecelCruise, false)],
            ..Default::default()
        };
        assert_eq!(state.cruise_button(), Some(CruiseButton::SetMinus));
    }

    #[test]
    fn test_distance_button_default() {
        let mut state = VehicleState::default();
        assert!(!state.distance_pressed());
        assert!(!state.driver_operating_buttons());

        state.distance_button = Some(true);
        assert!(state.distance_pressed());
        assert!(state.driver_operating_buttons());
    }

    #[test]
    fn test_button_type_mapping() {
        assert_eq!(ButtonType::AccelCruise.cruise_button(), Some(CruiseButton::SetPlus));
        assert_eq!(ButtonType::DecelCruise.cruise_button(), Some(CruiseButton::SetMinus));
        assert_eq!(ButtonType::ResumeCruise.cruise_button(), Some(CruiseButton::Resume));
        assert_eq!(ButtonType::Cancel.cruise_button(), Some(CruiseButton::Cancel));
        assert_eq!(ButtonType::SetCruise.cruise_button(), None);
        assert_eq!(ButtonType::GapAdjustCruise.cruise_button(), None);
    }

    #[test]
    fn test_state_deserialize_with_defaults() {
        let state: VehicleState = serde_json::from_str(
            r#"{"v_ego": 20.0, "button_events": [{"type": "accel_cruise", "pressed": true}]}"#,
        )
        .unwrap();
        assert_eq!(state.v_ego, 20.0);
        assert_eq!(state.cruise_buttons, None);
        assert_eq!(state.cruise_button(), Some(CruiseButton::SetPlus));
    }
}

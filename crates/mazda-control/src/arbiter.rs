//! 巡航按键仲裁
//!
//! 每个控制周期至多决定一个模拟按键。优先级：
//!
//! 1. 取消请求：踩刹车时先去抖，避免与原车 ACC 自身的取消/重新接合流程竞争；
//! 2. 恢复请求：规划层希望停车后起步；
//! 3. 速度跟随：按 [`ControlMode`] 选择策略，各自按节奏运行。
//!
//! 每个报文周期内发送多于一个模拟按键会被原车模块视为协议违规，
//! 因此互斥和节奏限制都必须保证。

use crate::config::{ControlMode, CruiseConfig};
use crate::state::{ControlIntent, VehicleState};
use crate::units::{MS_TO_KPH, UnitSystem};
use mazda_protocol::{CruiseButton, CruiseButtonsCommand};
use tracing::debug;

/// 取消按键发送节奏（周期）
pub const CANCEL_CADENCE: u64 = 10;

/// 恢复按键发送节奏（周期）
pub const RESUME_CADENCE: u64 = 5;

/// 刹车去抖周期数
///
/// 原车 `CRZ_CTRL` 为 50Hz，约 70ms 可以读到 3 帧并同步状态后再发送取消，
/// 否则第二次取消会把巡航主开关也关掉。
pub const BRAKE_DEBOUNCE_CYCLES: u32 = 7;

/// 仪表设定速度上限（m/s，约 126 km/h / 78 mph）
pub const MAX_SET_SPEED_MS: f64 = 35.0;

/// 目标速度比当前车速低超过该值时视为需要减速
pub const DECEL_GAP: i32 = 5;

/// 减速时目标速度额外下压量
///
/// 一次 SET- 只减一档，把目标再压低 10 才能得到与期望相当的减速度。
/// 该常数为实车标定值。
pub const DECEL_OVERSHOOT: i32 = 10;

/// 激活巡航所需的最低车速（无前车时，km/h）
pub const ACTIVATION_MIN_SPEED_KPH: f64 = 10.0;

/// 由周期推导按键帧计数器的分频
const COUNTER_DIVISOR: u64 = 10;

/// 当前巡航设定速度（显示单位，按步长取整）
pub fn cruise_set_point(units: UnitSystem, cruise_speed: f64) -> i32 {
    units.round_to_step(units.to_display(cruise_speed))
}

/// 期望速度换算为显示单位：先限制到 [`MAX_SET_SPEED_MS`]，负值按 0 处理
fn display_target(units: UnitSystem, set_speed: f64) -> i32 {
    units
        .to_display(set_speed.min(MAX_SET_SPEED_MS))
        .clamp(0, units.max_speed())
}

/// 减速下压
///
/// 目标（显示单位）比当前车速低超过 [`DECEL_GAP`] 时，再压低 [`DECEL_OVERSHOOT`]。
pub fn decel_overshoot(target: i32, v_ego_display: f64) -> i32 {
    if f64::from(target.saturating_add(DECEL_GAP)) < v_ego_display {
        target.saturating_sub(DECEL_OVERSHOOT)
    } else {
        target
    }
}

/// NativeLongitudinal 模式的目标设定速度
///
/// 限制上限并换算、减速下压、按步长取整，最后限制在可设定范围内。
pub fn native_target(units: UnitSystem, set_speed: f64, v_ego: f64) -> i32 {
    let target = decel_overshoot(
        display_target(units, set_speed),
        v_ego * units.ms_to_display(),
    );
    units.clamp_speed(units.round_to_step(target))
}

/// ButtonSimulated 模式的目标设定速度（不做减速下压）
pub fn button_target(units: UnitSystem, set_speed: f64) -> i32 {
    units.clamp_speed(units.round_to_step(display_target(units, set_speed)))
}

/// 比较目标与当前设定速度，决定 SET+/SET-
///
/// 只有当前设定速度在可调范围内才调整。
pub fn speed_adjustment(units: UnitSystem, target: i32, current: i32) -> Option<CruiseButton> {
    if target < current && current >= units.min_speed() {
        Some(CruiseButton::SetMinus)
    } else if target > current && current < units.max_speed() {
        Some(CruiseButton::SetPlus)
    } else {
        None
    }
}

/// 巡航按键仲裁器
///
/// 持有跨周期状态：刹车去抖计数和激活锁存。
#[derive(Debug, Clone, Default)]
pub struct CruiseArbiter {
    brake_counter: u32,
    activation_latched: bool,
}

impl CruiseArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 连续请求取消的周期数
    pub fn brake_counter(&self) -> u32 {
        self.brake_counter
    }

    /// 已发送过激活用的 RES
    pub fn activation_latched(&self) -> bool {
        self.activation_latched
    }

    /// 清除激活锁存（外部重新初始化时调用）
    pub fn reset_activation_latch(&mut self) {
        self.activation_latched = false;
    }

    /// 本周期的仲裁结果，至多一个按键
    pub fn arbitrate(
        &mut self,
        frame: u64,
        config: &CruiseConfig,
        intent: &ControlIntent,
        state: &VehicleState,
    ) -> Option<CruiseButtonsCommand> {
        let bus_counter = u64::from(state.crz_btns_counter);

        if intent.cancel {
            self.brake_counter = self.brake_counter.saturating_add(1);
            let debouncing = state.brake_pressed && self.brake_counter < BRAKE_DEBOUNCE_CYCLES;
            if frame % CANCEL_CADENCE == 0 && !debouncing {
                return Some(Self::press(CruiseButton::Cancel, bus_counter));
            }
            return None;
        }

        self.brake_counter = 0;

        if intent.resume && frame % RESUME_CADENCE == 0 {
            return Some(Self::press(CruiseButton::Resume, bus_counter));
        }

        if !intent.enabled || state.gas_pressed {
            return None;
        }

        let mode = config.control_mode;
        if frame % mode.cadence() != 0 {
            return None;
        }

        let button = match mode {
            ControlMode::NativeLongitudinal => self.native_longitudinal(config, intent, state),
            ControlMode::ButtonSimulated => self.button_simulated(config, intent, state),
        }?;

        Some(Self::press(button, frame / COUNTER_DIVISOR))
    }

    fn press(button: CruiseButton, counter: u64) -> CruiseButtonsCommand {
        debug!("Simulating cruise button {:?}", button);
        CruiseButtonsCommand::new(button, counter)
    }

    fn native_longitudinal(
        &self,
        config: &CruiseConfig,
        intent: &ControlIntent,
        state: &VehicleState,
    ) -> Option<CruiseButton> {
        // 不与驾驶员的手动操作冲突
        if state.driver_operating_buttons() || !state.cruise_enabled {
            return None;
        }

        let units = config.unit_system;
        let target = native_target(units, intent.set_speed, state.v_ego);
        let current = cruise_set_point(units, state.cruise_speed);
        let button = speed_adjustment(units, target, current);
        if button.is_some() {
            debug!(target, current, "Cruise set speed adjustment");
        }
        button
    }

    fn button_simulated(
        &mut self,
        config: &CruiseConfig,
        intent: &ControlIntent,
        state: &VehicleState,
    ) -> Option<CruiseButton> {
        if !state.cruise_enabled {
            let v_ego_kph = state.v_ego * MS_TO_KPH;
            let pedal_pressed = state.brake_pressed || state.gas_pressed;
            if (intent.lead_visible || v_ego_kph > ACTIVATION_MIN_SPEED_KPH)
                && !self.activation_latched
                && !pedal_pressed
            {
                self.activation_latched = true;
                debug!("Resume to activate cruise");
                return Some(CruiseButton::Resume);
            }
            return None;
        }

        if intent.resume {
            return Some(CruiseButton::Resume);
        }

        if config.pcm_speed {
            return None;
        }

        let units = config.unit_system;
        let target = button_target(units, intent.set_speed);
        let current = cruise_set_point(units, state.cruise_speed);
        speed_adjustment(units, target, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{KPH_TO_MS, MPH_TO_MS};

    fn native(units: UnitSystem) -> CruiseConfig {
        CruiseConfig::new(units, ControlMode::NativeLongitudinal, false)
    }

    fn buttons(units: UnitSystem, pcm_speed: bool) -> CruiseConfig {
        CruiseConfig::new(units, ControlMode::ButtonSimulated, pcm_speed)
    }

    fn cruising_mph(cruise: f64, v_ego: f64) -> VehicleState {
        VehicleState {
            cruise_enabled: true,
            cruise_speed: cruise * MPH_TO_MS,
            v_ego: v_ego * MPH_TO_MS,
            cruise_buttons: Some(0),
            ..Default::default()
        }
    }

    fn enabled_with_speed(set_speed: f64) -> ControlIntent {
        ControlIntent {
            enabled: true,
            set_speed,
            ..Default::default()
        }
    }

    // ========================================================================
    // 目标速度计算
    // ========================================================================

    #[test]
    fn test_decel_overshoot() {
        // 目标 90 mph，车速 100 mph：差距超过 5，目标下压到 80
        assert_eq!(decel_overshoot(90, 100.0), 80);
        // 差距恰好为 5 时不下压
        assert_eq!(decel_overshoot(95, 100.0), 95);
        assert_eq!(decel_overshoot(60, 64.0), 60);
        assert_eq!(decel_overshoot(i32::MIN, 100.0), i32::MIN);
    }

    #[test]
    fn test_native_target_deceleration_overshoot() {
        // 期望 90 mph 先限制到 35 m/s = 78 mph，车速 100 mph 时再下压到 68
        let target = native_target(UnitSystem::Imperial, 90.0 * MPH_TO_MS, 100.0 * MPH_TO_MS);
        assert_eq!(target, 68);
        // 上限以内的目标直接下压
        let target = native_target(UnitSystem::Imperial, 60.0 * MPH_TO_MS, 70.0 * MPH_TO_MS);
        assert_eq!(target, 50);
    }

    #[test]
    fn test_targets_with_extreme_set_speed() {
        for units in [UnitSystem::Metric, UnitSystem::Imperial] {
            for set_speed in [-1.0e12, f64::MIN, f64::NEG_INFINITY, f64::NAN, 1.0e12] {
                let target = native_target(units, set_speed, 30.0);
                assert!((units.min_speed()..=units.max_speed()).contains(&target));
                let target = button_target(units, set_speed);
                assert!((units.min_speed()..=units.max_speed()).contains(&target));
            }
        }
    }

    #[test]
    fn test_native_target_no_overshoot_within_gap() {
        let target = native_target(UnitSystem::Imperial, 60.0 * MPH_TO_MS, 64.0 * MPH_TO_MS);
        assert_eq!(target, 60);
    }

    #[test]
    fn test_native_target_ceiling() {
        // 50 m/s 限制到 35 m/s = 126 km/h → 取整 125
        let target = native_target(UnitSystem::Metric, 50.0, 0.0);
        assert_eq!(target, 125);
        // 35 m/s = 78.3 mph
        let target = native_target(UnitSystem::Imperial, 50.0, 0.0);
        assert_eq!(target, 78);
    }

    #[test]
    fn test_native_target_clamped_to_minimum() {
        let target = native_target(UnitSystem::Metric, 5.0 * KPH_TO_MS, 0.0);
        assert_eq!(target, 30);
        let target = native_target(UnitSystem::Imperial, 25.0 * MPH_TO_MS, 60.0 * MPH_TO_MS);
        assert_eq!(target, 20);
    }

    #[test]
    fn test_speed_adjustment_bounds() {
        let units = UnitSystem::Imperial;
        assert_eq!(speed_adjustment(units, 40, 65), Some(CruiseButton::SetMinus));
        assert_eq!(speed_adjustment(units, 70, 65), Some(CruiseButton::SetPlus));
        assert_eq!(speed_adjustment(units, 65, 65), None);
        // 当前设定速度低于下限时不再 SET-
        assert_eq!(speed_adjustment(units, 15, 19), None);
        // 当前设定速度已到上限时不再 SET+
        assert_eq!(speed_adjustment(units, 110, 100), None);
    }

    // ========================================================================
    // 取消与恢复
    // ========================================================================

    #[test]
    fn test_cancel_debounced_while_braking() {
        let mut arbiter = CruiseArbiter::new();
        let config = native(UnitSystem::Imperial);
        let intent = ControlIntent {
            cancel: true,
            ..Default::default()
        };
        let state = VehicleState {
            brake_pressed: true,
            crz_btns_counter: 5,
            ..Default::default()
        };

        // 周期 4..=9：计数 1..=6，去抖中
        for frame in 4..10 {
            assert_eq!(arbiter.arbitrate(frame, &config, &intent, &state), None);
        }
        assert_eq!(arbiter.brake_counter(), 6);

        // 第 7 个周期恰好落在 10 周期节奏上
        let cmd = arbiter.arbitrate(10, &config, &intent, &state).unwrap();
        assert_eq!(cmd.button, CruiseButton::Cancel);
        assert_eq!(cmd.counter, 6);
    }

    #[test]
    fn test_cancel_without_brake_only_on_cadence() {
        let mut arbiter = CruiseArbiter::new();
        let config = native(UnitSystem::Imperial);
        let intent = ControlIntent {
            cancel: true,
            ..Default::default()
        };
        let state = VehicleState::default();

        assert!(arbiter.arbitrate(0, &config, &intent, &state).is_some());
        for frame in 1..10 {
            assert!(arbiter.arbitrate(frame, &config, &intent, &state).is_none());
        }
        assert!(arbiter.arbitrate(10, &config, &intent, &state).is_some());
    }

    #[test]
    fn test_cancel_release_resets_counter() {
        let mut arbiter = CruiseArbiter::new();
        let config = native(UnitSystem::Imperial);
        let cancel = ControlIntent {
            cancel: true,
            ..Default::default()
        };
        let state = VehicleState {
            brake_pressed: true,
            ..Default::default()
        };

        for frame in 0..5 {
            arbiter.arbitrate(frame, &config, &cancel, &state);
        }
        assert_eq!(arbiter.brake_counter(), 5);

        arbiter.arbitrate(5, &config, &ControlIntent::default(), &state);
        assert_eq!(arbiter.brake_counter(), 0);
    }

    #[test]
    fn test_resume_cadence_uses_bus_counter() {
        let mut arbiter = CruiseArbiter::new();
        let config = native(UnitSystem::Imperial);
        let intent = ControlIntent {
            resume: true,
            ..Default::default()
        };
        let state = VehicleState {
            crz_btns_counter: 15,
            ..Default::default()
        };

        let cmd = arbiter.arbitrate(5, &config, &intent, &state).unwrap();
        assert_eq!(cmd.button, CruiseButton::Resume);
        assert_eq!(cmd.counter, 0);
        assert!(arbiter.arbitrate(6, &config, &intent, &state).is_none());
    }

    #[test]
    fn test_cancel_wins_over_resume() {
        let mut arbiter = CruiseArbiter::new();
        let config = native(UnitSystem::Imperial);
        let intent = ControlIntent {
            cancel: true,
            resume: true,
            enabled: true,
            ..Default::default()
        };
        let cmd = arbiter
            .arbitrate(0, &config, &intent, &VehicleState::default())
            .unwrap();
        assert_eq!(cmd.button, CruiseButton::Cancel);
    }

    // ========================================================================
    // NativeLongitudinal
    // ========================================================================

    #[test]
    fn test_native_set_minus_scenario() {
        // 英制：当前 65，期望 50，车速 70 → 目标 40 → SET-
        let mut arbiter = CruiseArbiter::new();
        let config = native(UnitSystem::Imperial);
        let intent = enabled_with_speed(50.0 * MPH_TO_MS);
        let state = cruising_mph(65.0, 70.0);

        let cmd = arbiter.arbitrate(30, &config, &intent, &state).unwrap();
        assert_eq!(cmd.button, CruiseButton::SetMinus);
        // 计数器由周期推导：30 / 10 = 3 → 4
        assert_eq!(cmd.counter, 4);
    }

    #[test]
    fn test_native_set_plus_metric_scenario() {
        let mut arbiter = CruiseArbiter::new();
        let config = native(UnitSystem::Metric);
        let intent = enabled_with_speed(115.0 * KPH_TO_MS);
        let state = VehicleState {
            cruise_enabled: true,
            cruise_speed: 100.0 * KPH_TO_MS,
            v_ego: 100.0 * KPH_TO_MS,
            ..Default::default()
        };

        let cmd = arbiter.arbitrate(0, &config, &intent, &state).unwrap();
        assert_eq!(cmd.button, CruiseButton::SetPlus);
    }

    #[test]
    fn test_native_off_cadence_and_gas() {
        let mut arbiter = CruiseArbiter::new();
        let config = native(UnitSystem::Imperial);
        let intent = enabled_with_speed(50.0 * MPH_TO_MS);
        let mut state = cruising_mph(65.0, 70.0);

        assert!(arbiter.arbitrate(15, &config, &intent, &state).is_none());

        state.gas_pressed = true;
        assert!(arbiter.arbitrate(20, &config, &intent, &state).is_none());
    }

    #[test]
    fn test_native_yields_to_driver_buttons() {
        let mut arbiter = CruiseArbiter::new();
        let config = native(UnitSystem::Imperial);
        let intent = enabled_with_speed(50.0 * MPH_TO_MS);

        let mut state = cruising_mph(65.0, 70.0);
        state.cruise_buttons = Some(1);
        assert!(arbiter.arbitrate(0, &config, &intent, &state).is_none());

        let mut state = cruising_mph(65.0, 70.0);
        state.distance_button = Some(true);
        assert!(arbiter.arbitrate(0, &config, &intent, &state).is_none());
    }

    #[test]
    fn test_native_requires_cruise_enabled_and_intent_enabled() {
        let mut arbiter = CruiseArbiter::new();
        let config = native(UnitSystem::Imperial);

        let mut state = cruising_mph(65.0, 70.0);
        state.cruise_enabled = false;
        let intent = enabled_with_speed(50.0 * MPH_TO_MS);
        assert!(arbiter.arbitrate(0, &config, &intent, &state).is_none());

        let state = cruising_mph(65.0, 70.0);
        let intent = ControlIntent {
            enabled: false,
            ..enabled_with_speed(50.0 * MPH_TO_MS)
        };
        assert!(arbiter.arbitrate(0, &config, &intent, &state).is_none());
    }

    // ========================================================================
    // ButtonSimulated
    // ========================================================================

    #[test]
    fn test_activation_resume_latched() {
        let mut arbiter = CruiseArbiter::new();
        let config = buttons(UnitSystem::Metric, true);
        let intent = ControlIntent {
            enabled: true,
            lead_visible: true,
            ..Default::default()
        };
        let state = VehicleState::default();

        let cmd = arbiter.arbitrate(20, &config, &intent, &state).unwrap();
        assert_eq!(cmd.button, CruiseButton::Resume);
        assert_eq!(cmd.counter, 3);
        assert!(arbiter.activation_latched());

        // 条件仍满足，但已锁存
        for frame in [40, 60, 80, 100] {
            assert!(arbiter.arbitrate(frame, &config, &intent, &state).is_none());
        }

        arbiter.reset_activation_latch();
        assert!(arbiter.arbitrate(120, &config, &intent, &state).is_some());
    }

    #[test]
    fn test_activation_requires_lead_or_speed() {
        let mut arbiter = CruiseArbiter::new();
        let config = buttons(UnitSystem::Metric, true);
        let intent = ControlIntent {
            enabled: true,
            ..Default::default()
        };

        let slow = VehicleState {
            v_ego: 9.0 * KPH_TO_MS,
            ..Default::default()
        };
        assert!(arbiter.arbitrate(0, &config, &intent, &slow).is_none());
        assert!(!arbiter.activation_latched());

        let moving = VehicleState {
            v_ego: 20.0 * KPH_TO_MS,
            ..Default::default()
        };
        assert!(arbiter.arbitrate(20, &config, &intent, &moving).is_some());
    }

    #[test]
    fn test_activation_blocked_by_brake() {
        let mut arbiter = CruiseArbiter::new();
        let config = buttons(UnitSystem::Metric, true);
        let intent = ControlIntent {
            enabled: true,
            lead_visible: true,
            ..Default::default()
        };
        let state = VehicleState {
            brake_pressed: true,
            ..Default::default()
        };
        assert!(arbiter.arbitrate(0, &config, &intent, &state).is_none());
        assert!(!arbiter.activation_latched());
    }

    #[test]
    fn test_button_simulated_adjusts_without_pcm_speed() {
        let mut arbiter = CruiseArbiter::new();
        let intent = enabled_with_speed(50.0 * MPH_TO_MS);
        let state = cruising_mph(65.0, 70.0);

        let config = buttons(UnitSystem::Imperial, false);
        let cmd = arbiter.arbitrate(40, &config, &intent, &state).unwrap();
        assert_eq!(cmd.button, CruiseButton::SetMinus);

        let config = buttons(UnitSystem::Imperial, true);
        assert!(arbiter.arbitrate(40, &config, &intent, &state).is_none());
    }

    #[test]
    fn test_button_simulated_cadence() {
        let mut arbiter = CruiseArbiter::new();
        let config = buttons(UnitSystem::Imperial, false);
        let intent = enabled_with_speed(50.0 * MPH_TO_MS);
        let state = cruising_mph(65.0, 70.0);

        assert!(arbiter.arbitrate(10, &config, &intent, &state).is_none());
        assert!(arbiter.arbitrate(20, &config, &intent, &state).is_some());
    }
}

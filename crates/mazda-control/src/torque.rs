//! 转向扭矩限幅
//!
//! 接口 [`SteerTorqueLimiter`] 对应外部的扭矩速率限制原语；
//! [`DriverTorqueLimiter`] 为默认实现（驾驶员扭矩相关的限幅 + 变化率限制）。

use serde::{Deserialize, Serialize};

/// `LKAS_REQUEST` 的最大转向扭矩
pub const STEER_MAX: i32 = 800;

/// 转向扭矩限制参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SteerLimits {
    /// 最大转向扭矩
    pub max: i32,
    /// 每周期增大幅度上限
    pub delta_up: i32,
    /// 每周期减小幅度上限
    pub delta_down: i32,
    pub driver_allowance: i32,
    pub driver_multiplier: i32,
    pub driver_factor: i32,
}

impl Default for SteerLimits {
    fn default() -> Self {
        Self {
            max: STEER_MAX,
            delta_up: 10,
            delta_down: 25,
            driver_allowance: 15,
            driver_multiplier: 1,
            driver_factor: 1,
        }
    }
}

/// 转向扭矩速率限制
pub trait SteerTorqueLimiter: Send {
    /// 限幅参数（控制器用 `max` 换算执行量）
    fn limits(&self) -> SteerLimits;

    /// 计算本周期允许的扭矩
    ///
    /// - `requested`: 期望扭矩
    /// - `last`: 上一周期实际施加的扭矩
    /// - `driver_torque`: 驾驶员施加的扭矩
    fn apply(&self, requested: i32, last: i32, driver_torque: f64) -> i32;
}

/// 驾驶员扭矩限幅器
///
/// 1. 驾驶员反向用力时收窄允许窗口；
/// 2. 扭矩幅值增大时每周期最多变化 `delta_up`，减小时最多 `delta_down`。
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverTorqueLimiter {
    limits: SteerLimits,
}

impl DriverTorqueLimiter {
    pub fn new(limits: SteerLimits) -> Self {
        Self { limits }
    }
}

impl SteerTorqueLimiter for DriverTorqueLimiter {
    fn limits(&self) -> SteerLimits {
        self.limits
    }

    fn apply(&self, requested: i32, last: i32, driver_torque: f64) -> i32 {
        let l = &self.limits;
        let max = f64::from(l.max);
        let allowance = f64::from(l.driver_allowance);
        let factor = f64::from(l.driver_factor);
        let multiplier = f64::from(l.driver_multiplier);

        // 驾驶员扭矩修正后的窗口
        let driver_max = max + (allowance + driver_torque * factor) * multiplier;
        let driver_min = -max + (-allowance + driver_torque * factor) * multiplier;
        let max_allowed = driver_max.min(max).max(0.0);
        let min_allowed = driver_min.max(-max).min(0.0);

        let mut torque = f64::from(requested).clamp(min_allowed, max_allowed);

        // 变化率
        let last = f64::from(last);
        let up = f64::from(l.delta_up);
        let down = f64::from(l.delta_down);
        torque = if last > 0.0 {
            torque.clamp((last - down).max(-up), last + up)
        } else {
            torque.clamp(last - up, (last + down).min(up))
        };

        torque.round_ties_even() as i32
    }
}

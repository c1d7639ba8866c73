//! Builder 模式实现
//!
//! 提供链式构造 `CarController` 实例的便捷方式。

use crate::config::CruiseConfig;
use crate::controller::CarController;
use crate::params::{MemoryParams, ParamStore};
use crate::torque::{DriverTorqueLimiter, SteerLimits, SteerTorqueLimiter};

/// CarController Builder（链式构造）
///
/// # Example
///
/// ```
/// use mazda_control::{CarControllerBuilder, MemoryParams, KEY_IS_METRIC};
///
/// // 使用默认配置（空参数表，英制，NativeLongitudinal）
/// let controller = CarControllerBuilder::new().build();
///
/// // 指定参数存储
/// let params = MemoryParams::new().with_bool(KEY_IS_METRIC, true);
/// let controller = CarControllerBuilder::new()
///     .params(params)
///     .build();
/// ```
#[derive(Default)]
pub struct CarControllerBuilder {
    /// 参数存储（默认空内存表）
    params: Option<Box<dyn ParamStore>>,
    /// 扭矩限幅器（默认 `DriverTorqueLimiter`）
    limiter: Option<Box<dyn SteerTorqueLimiter>>,
    /// 第一次刷新前使用的配置
    config: Option<CruiseConfig>,
}

impl CarControllerBuilder {
    /// 创建新的 Builder
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置参数存储
    pub fn params(mut self, params: impl ParamStore + 'static) -> Self {
        self.params = Some(Box::new(params));
        self
    }

    /// 设置扭矩限幅器
    pub fn limiter(mut self, limiter: impl SteerTorqueLimiter + 'static) -> Self {
        self.limiter = Some(Box::new(limiter));
        self
    }

    /// 使用默认限幅器并指定限幅参数
    pub fn steer_limits(self, limits: SteerLimits) -> Self {
        self.limiter(DriverTorqueLimiter::new(limits))
    }

    /// 设置初始配置
    ///
    /// 周期 0 会从参数存储刷新一次，之后每 50 周期刷新。
    pub fn config(mut self, config: CruiseConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 构建 CarController 实例
    pub fn build(self) -> CarController {
        let params = self
            .params
            .unwrap_or_else(|| Box::new(MemoryParams::new()));
        let limiter = self
            .limiter
            .unwrap_or_else(|| Box::new(DriverTorqueLimiter::default()));
        CarController::new(self.config.unwrap_or_default(), params, limiter)
    }
}

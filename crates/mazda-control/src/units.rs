//! 单位制与车速换算
//!
//! 仪表设定速度以整数显示单位（km/h 或 mph）工作，内部车速统一为 m/s。

use serde::{Deserialize, Serialize};

/// m/s → km/h
pub const MS_TO_KPH: f64 = 3.6;

/// m/s → mph
pub const MS_TO_MPH: f64 = MS_TO_KPH / 1.609344;

/// km/h → m/s
pub const KPH_TO_MS: f64 = 1.0 / MS_TO_KPH;

/// mph → m/s
pub const MPH_TO_MS: f64 = 1.0 / MS_TO_MPH;

/// 单位制
///
/// 决定设定速度的取整粒度（公制 5，英制 1）以及巡航设定速度的上下限。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    /// km/h
    Metric,
    /// mph（默认）
    #[default]
    Imperial,
}

impl UnitSystem {
    pub fn from_is_metric(is_metric: bool) -> Self {
        if is_metric {
            Self::Metric
        } else {
            Self::Imperial
        }
    }

    pub fn is_metric(self) -> bool {
        self == Self::Metric
    }

    /// m/s 到显示单位的换算系数
    pub fn ms_to_display(self) -> f64 {
        match self {
            Self::Metric => MS_TO_KPH,
            Self::Imperial => MS_TO_MPH,
        }
    }

    /// 设定速度步长
    pub fn step(self) -> i32 {
        match self {
            Self::Metric => 5,
            Self::Imperial => 1,
        }
    }

    /// 巡航可设定的最低速度
    pub fn min_speed(self) -> i32 {
        match self {
            Self::Metric => 30,
            Self::Imperial => 20,
        }
    }

    /// 巡航可设定的最高速度
    pub fn max_speed(self) -> i32 {
        match self {
            Self::Metric => 160,
            Self::Imperial => 100,
        }
    }

    /// m/s 换算为显示单位并取整（四舍六入五成双）
    pub fn to_display(self, speed_ms: f64) -> i32 {
        (speed_ms * self.ms_to_display()).round_ties_even() as i32
    }

    /// 按步长取整（四舍六入五成双）
    pub fn round_to_step(self, speed: i32) -> i32 {
        let step = self.step();
        if step == 1 {
            return speed;
        }
        ((f64::from(speed) / f64::from(step)).round_ties_even() * f64::from(step)) as i32
    }

    /// 限制在可设定范围内
    pub fn clamp_speed(self, speed: i32) -> i32 {
        speed.clamp(self.min_speed(), self.max_speed())
    }
}

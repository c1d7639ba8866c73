//! 场景系统
//!
//! JSON 场景文件离线驱动 `CarController`

use anyhow::{Context, Result};
use mazda_control::{
    CarController, CarControllerBuilder, ControlIntent, MemoryParams, ParamStore, ParamValue,
    VehicleState,
};
use mazda_protocol::{PackedCall, RecordingPacker};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// 场景
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// 场景名称
    pub name: String,

    /// 场景描述
    #[serde(default)]
    pub description: String,

    /// 内联参数（键同参数存储）
    #[serde(default)]
    pub params: BTreeMap<String, ScenarioParam>,

    /// 步骤序列
    pub steps: Vec<ScenarioStep>,
}

/// 内联参数值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioParam {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<&ScenarioParam> for ParamValue {
    fn from(param: &ScenarioParam) -> Self {
        match param {
            ScenarioParam::Bool(v) => ParamValue::Bool(*v),
            ScenarioParam::Int(v) => ParamValue::Int(*v),
            ScenarioParam::Str(v) => ParamValue::Str(v.clone()),
        }
    }
}

fn default_cycles() -> u64 {
    1
}

/// 场景步骤：相同输入连续执行若干周期
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// 周期数
    #[serde(default = "default_cycles")]
    pub cycles: u64,

    #[serde(default)]
    pub intent: ControlIntent,

    #[serde(default)]
    pub state: VehicleState,

    /// 本步骤开始前清除激活锁存
    #[serde(default)]
    pub reset_activation_latch: bool,
}

/// 单周期记录
#[derive(Debug, Clone, Serialize)]
pub struct CycleRecord {
    pub frame: u64,
    pub steer: f64,
    pub steer_output_can: i32,
    pub frames: Vec<PackedCall>,
}

impl Scenario {
    /// 加载场景文件
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("读取场景文件失败")?;

        let scenario: Scenario = serde_json::from_str(&content).context("解析场景 JSON 失败")?;

        Ok(scenario)
    }

    /// 总周期数
    pub fn total_cycles(&self) -> u64 {
        self.steps.iter().map(|step| step.cycles).sum()
    }

    /// 内联参数表
    pub fn memory_params(&self) -> MemoryParams {
        let mut params = MemoryParams::new();
        for (key, value) in &self.params {
            params.set(key, value.into());
        }
        params
    }
}

/// 场景执行器
pub struct ScenarioRunner {
    controller: CarController,
    packer: RecordingPacker,
}

impl ScenarioRunner {
    /// 使用指定的参数存储创建执行器
    pub fn new(params: impl ParamStore + 'static) -> Self {
        Self {
            controller: CarControllerBuilder::new().params(params).build(),
            packer: RecordingPacker::new(),
        }
    }

    pub fn controller(&self) -> &CarController {
        &self.controller
    }

    /// 执行全部步骤
    pub fn run(&mut self, scenario: &Scenario) -> Vec<CycleRecord> {
        let mut records = Vec::new();

        for step in &scenario.steps {
            if step.reset_activation_latch {
                self.controller.reset_activation_latch();
            }

            for _ in 0..step.cycles {
                records.push(self.run_cycle(&step.intent, &step.state));
            }
        }

        records
    }

    fn run_cycle(&mut self, intent: &ControlIntent, state: &VehicleState) -> CycleRecord {
        let frame = self.controller.frame();
        let (actuators, _) = self.controller.update(intent, state, &self.packer);

        CycleRecord {
            frame,
            steer: actuators.steer,
            steer_output_can: actuators.steer_output_can,
            frames: self.packer.take_calls(),
        }
    }
}

//! 车辆参数存储
//!
//! 控制器按固定节奏从参数存储读取单位制和控制模式。
//! 参数存储是外部组件，这里只定义接口并提供两个实现：
//! - [`MemoryParams`]：内存表，用于测试和嵌入式调用方
//! - [`TomlParams`]：TOML 文件，每次读取都重新打开文件

use crate::error::ParamError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 参数键：速度控制通道选择（整数）
pub const KEY_SPEED_FROM_PCM: &str = "SpeedFromPCM";

/// 参数键：是否公制（布尔）
pub const KEY_IS_METRIC: &str = "IsMetric";

/// 参数键：显式控制模式（字符串，可选，优先于 `SpeedFromPCM`）
pub const KEY_CONTROL_MODE: &str = "ControlMode";

/// 参数键：是否使用原车速度通道（布尔，可选，优先于 `SpeedFromPCM`）
pub const KEY_PCM_SPEED: &str = "PcmSpeed";

/// 参数值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Int(i64),
    Bool(bool),
    Str(String),
}

/// 参数存储接口
pub trait ParamStore: Send {
    /// 读取原始参数值，不存在时返回 `Ok(None)`
    fn get(&self, key: &str) -> Result<Option<ParamValue>, ParamError>;

    fn get_int(&self, key: &str) -> Result<Option<i64>, ParamError> {
        match self.get(key)? {
            None => Ok(None),
            Some(ParamValue::Int(v)) => Ok(Some(v)),
            Some(_) => Err(ParamError::TypeMismatch {
                key: key.to_string(),
                expected: "int",
            }),
        }
    }

    /// 读取布尔参数，整数 0/1 也接受
    fn get_bool(&self, key: &str) -> Result<Option<bool>, ParamError> {
        match self.get(key)? {
            None => Ok(None),
            Some(ParamValue::Bool(v)) => Ok(Some(v)),
            Some(ParamValue::Int(0)) => Ok(Some(false)),
            Some(ParamValue::Int(1)) => Ok(Some(true)),
            Some(_) => Err(ParamError::TypeMismatch {
                key: key.to_string(),
                expected: "bool",
            }),
        }
    }

    fn get_str(&self, key: &str) -> Result<Option<String>, ParamError> {
        match self.get(key)? {
            None => Ok(None),
            Some(ParamValue::Str(v)) => Ok(Some(v)),
            Some(_) => Err(ParamError::TypeMismatch {
                key: key.to_string(),
                expected: "string",
            }),
        }
    }

    /// 一次性读取多个键的快照
    ///
    /// 同一次配置解析内的所有键来自同一版本的数据。
    fn snapshot(&self, keys: &[&str]) -> Result<MemoryParams, ParamError> {
        let mut snapshot = MemoryParams::new();
        for key in keys {
            if let Some(value) = self.get(key)? {
                snapshot.set(key, value);
            }
        }
        Ok(snapshot)
    }
}

impl<S: ParamStore + ?Sized> ParamStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<ParamValue>, ParamError> {
        (**self).get(key)
    }

    fn snapshot(&self, keys: &[&str]) -> Result<MemoryParams, ParamError> {
        (**self).snapshot(keys)
    }
}

/// 内存参数表
#[derive(Debug, Clone, Default)]
pub struct MemoryParams {
    values: HashMap<String, ParamValue>,
}

impl MemoryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_int(mut self, key: &str, value: i64) -> Self {
        self.set(key, ParamValue::Int(value));
        self
    }

    pub fn with_bool(mut self, key: &str, value: bool) -> Self {
        self.set(key, ParamValue::Bool(value));
        self
    }

    pub fn with_str(mut self, key: &str, value: &str) -> Self {
        self.set(key, ParamValue::Str(value.to_string()));
        self
    }

    pub fn set(&mut self, key: &str, value: ParamValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.values.remove(key)
    }
}

impl ParamStore for MemoryParams {
    fn get(&self, key: &str) -> Result<Option<ParamValue>, ParamError> {
        Ok(self.values.get(key).cloned())
    }
}

/// TOML 文件参数存储
///
/// 文件为扁平表：
///
/// ```toml
/// SpeedFromPCM = 1
/// IsMetric = true
/// ```
///
/// 每次读取都重新解析文件，因此外部进程修改文件后下一次刷新即生效。
/// [`ParamStore::snapshot`] 只读一次文件。
#[derive(Debug, Clone)]
pub struct TomlParams {
    path: PathBuf,
}

impl TomlParams {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<toml::Table, ParamError> {
        let content = fs::read_to_string(&self.path).map_err(|source| ParamError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }
}

fn lookup(table: &toml::Table, key: &str) -> Result<Option<ParamValue>, ParamError> {
    match table.get(key) {
        None => Ok(None),
        Some(toml::Value::Integer(v)) => Ok(Some(ParamValue::Int(*v))),
        Some(toml::Value::Boolean(v)) => Ok(Some(ParamValue::Bool(*v))),
        Some(toml::Value::String(v)) => Ok(Some(ParamValue::Str(v.clone()))),
        Some(_) => Err(ParamError::TypeMismatch {
            key: key.to_string(),
            expected: "int, bool or string",
        }),
    }
}

impl ParamStore for TomlParams {
    fn get(&self, key: &str) -> Result<Option<ParamValue>, ParamError> {
        lookup(&self.load()?, key)
    }

    fn snapshot(&self, keys: &[&str]) -> Result<MemoryParams, ParamError> {
        let table = self.load()?;
        let mut snapshot = MemoryParams::new();
        for key in keys {
            if let Some(value) = lookup(&table, key)? {
                snapshot.set(key, value);
            }
        }
        Ok(snapshot)
    }
}

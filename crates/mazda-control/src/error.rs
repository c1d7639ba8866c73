//! 控制层错误类型定义
//!
//! 控制路径本身不会失败；这里只有参数读取相关的错误，
//! 调用方（`CarController`）遇到错误时回退到默认配置并记录日志。

use std::path::PathBuf;
use thiserror::Error;

/// 参数读取错误
#[derive(Error, Debug)]
pub enum ParamError {
    /// 参数文件读取失败
    #[error("Failed to read params file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 参数文件格式错误
    #[error("Failed to parse params file: {0}")]
    Parse(#[from] toml::de::Error),

    /// 参数类型不匹配
    #[error("Param {key} has wrong type, expected {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    /// 参数取值非法
    #[error("Param {key} has invalid value: {value}")]
    InvalidValue { key: String, value: String },

    /// 参数存储不可用
    #[error("Param store unavailable: {0}")]
    Unavailable(String),
}

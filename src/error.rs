//! 错误处理模块
//!
//! 定义配置导入导出引擎的统一错误类型

use crate::validation::Violation;
use thiserror::Error;

/// 配置导入导出引擎的主要错误类型
#[derive(Error, Debug)]
pub enum ConfigPortError {
    /// 编解码错误
    #[error("编解码错误: {0}")]
    Codec(#[from] CodecError),

    /// 版本迁移错误
    #[error("版本迁移错误: {0}")]
    Migration(#[from] MigrationError),

    /// 模式注册表错误
    #[error("模式注册表错误: {0}")]
    Registry(#[from] RegistryError),

    /// 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),

    /// 引擎配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 严格模式下存在校验问题，导入被拒绝
    #[error("导入被拒绝: 共 {} 个校验问题", .0.len())]
    Rejected(Vec<Violation>),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 编解码错误类型
#[derive(Error, Debug)]
pub enum CodecError {
    /// JSON语法错误
    #[error("JSON格式错误: {0}")]
    Malformed(#[source] serde_json::Error),

    /// 顶层不是对象
    #[error("顶层必须是JSON对象")]
    NotAnObject,

    /// 缺少必需的顶层字段
    #[error("缺少顶层字段: {0}")]
    MissingField(&'static str),

    /// 出现未定义的顶层字段
    #[error("未知的顶层字段: {0}")]
    UnexpectedField(String),

    /// 顶层字段取值非法
    #[error("字段 {field} 非法: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// 输入超过大小上限
    #[error("输入过大: {size} 字节，上限 {limit} 字节")]
    TooLarge { size: usize, limit: usize },
}

/// 版本迁移错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    /// 版本号不在已知迁移链内
    #[error("未知的模式版本: {0}")]
    UnknownVersion(u32),

    /// 两个版本之间没有迁移路径
    #[error("没有从版本 {from} 到版本 {to} 的迁移路径")]
    NoPath { from: u32, to: u32 },

    /// 单步迁移失败
    #[error("版本 {from} -> {to} 迁移失败: {reason}")]
    StepFailed { from: u32, to: u32, reason: String },
}

/// 模式注册表构建错误（启动期致命错误）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// 模块重复注册
    #[error("模块重复注册: {0}")]
    DuplicateModule(String),

    /// 同一对象内字段重复
    #[error("模块 {module} 中字段重复: {field}")]
    DuplicateField { module: String, field: String },

    /// 不变量引用了未声明的字段
    #[error("模块 {module} 中引用了未知字段: {field}")]
    UnknownField { module: String, field: String },

    /// 注册表缺少模块
    #[error("注册表缺少模块: {0}")]
    MissingModule(String),

    /// 全局注册表已安装
    #[error("全局模式注册表已经安装")]
    AlreadyInstalled,
}

/// 导出错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    /// 信封从未经过校验
    #[error("信封未经校验，拒绝导出")]
    NotValidated,

    /// 导出前复检发现问题
    #[error("导出前复检失败: 共 {} 个校验问题", .0.len())]
    Invalid(Vec<Violation>),

    /// 序列化失败
    #[error("序列化失败: {0}")]
    Encode(#[source] serde_json::Error),
}

/// 引擎配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ConfigPortError>;

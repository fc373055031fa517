//! 配置数据结构定义
//!
//! 定义引擎自身的配置结构体和验证逻辑

use crate::model::{CURRENT_VERSION, MIN_VERSION};
use serde::{Deserialize, Serialize};

/// 引擎配置，包含导入、导出、报告和日志四部分
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// 导入配置
    #[serde(default)]
    pub import: ImportConfig,
    /// 导出配置
    #[serde(default)]
    pub export: ExportConfig,
    /// 报告配置
    #[serde(default)]
    pub report: ReportConfig,
    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 导入配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportConfig {
    /// 严格模式：存在任何校验问题即拒绝导入
    #[serde(default)]
    pub strict: bool,
    /// 输入大小上限（字节），0 表示不限制
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,
}

/// 导出配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    /// 是否美化输出
    #[serde(default)]
    pub pretty: bool,
    /// 导出前复检发现问题时是否拒绝导出
    #[serde(default = "default_require_clean")]
    pub require_clean: bool,
    /// 导出的模式版本
    #[serde(default = "default_target_version")]
    pub target_version: u32,
}

/// 报告配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// 自定义Handlebars报告模板
    pub template: Option<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 是否使用JSON格式
    #[serde(default)]
    pub json_format: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            strict: false,
            max_input_bytes: default_max_input_bytes(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            require_clean: default_require_clean(),
            target_version: default_target_version(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

// 默认值函数
fn default_max_input_bytes() -> usize {
    1024 * 1024 // 1 MiB
}
fn default_require_clean() -> bool {
    true
}
fn default_target_version() -> u32 {
    CURRENT_VERSION
}
fn default_log_level() -> String {
    "info".to_string()
}

/// 支持的日志级别，配置校验与日志初始化共用
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &EngineConfig) -> Result<(), String> {
    // 验证日志级别
    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            config.logging.level, LOG_LEVELS
        ));
    }

    // 验证导出版本
    let version = config.export.target_version;
    if !(MIN_VERSION..=CURRENT_VERSION).contains(&version) {
        return Err(format!(
            "无效的导出版本: {}，支持的版本: {}..={}",
            version, MIN_VERSION, CURRENT_VERSION
        ));
    }

    // 验证报告模板语法
    if let Some(ref template) = config.report.template {
        if template.trim().is_empty() {
            return Err("报告模板不能为空".to_string());
        }
        let mut handlebars = handlebars::Handlebars::new();
        handlebars
            .register_template_string("report", template)
            .map_err(|e| format!("报告模板语法错误: {}", e))?;
    }

    Ok(())
}

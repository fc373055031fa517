//! 校验问题
//!
//! 字段级、非致命的校验结论，带有字段路径和问题类别。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 校验问题类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// 缺少必填字段
    MissingRequired,
    /// 类型不匹配（包括无法解析的时长）
    TypeMismatch,
    /// 枚举值不在允许范围内
    UnknownEnumValue,
    /// 违反跨字段不变量
    InvariantViolated,
    /// 未定义的键
    UnknownKey,
}

impl ViolationKind {
    /// 线上名称
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::MissingRequired => "missing_required",
            ViolationKind::TypeMismatch => "type_mismatch",
            ViolationKind::UnknownEnumValue => "unknown_enum_value",
            ViolationKind::InvariantViolated => "invariant_violated",
            ViolationKind::UnknownKey => "unknown_key",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个校验问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// 字段路径，例如 `warns.action_duration`、`filters.filters[2].type`
    pub path: String,
    /// 问题类别
    pub kind: ViolationKind,
    /// 说明
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    /// 路径的第一段，即模块名
    pub fn module(&self) -> &str {
        self.path
            .split(['.', '['])
            .next()
            .unwrap_or(self.path.as_str())
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.path, self.kind, self.message)
    }
}

/// 一次校验的结果：尽力规范化后的值以及全部问题
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    /// 规范化后的值
    pub normalized: serde_json::Value,
    /// 校验问题
    pub violations: Vec<Violation>,
}

impl Validation {
    /// 是否没有任何问题
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

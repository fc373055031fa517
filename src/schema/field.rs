//! 字段定义
//!
//! 描述单个字段的类型、默认值、可空性以及跨字段不变量。

use serde_json::{Map, Value};

/// 字段的基本类型
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// 布尔值
    Bool,
    /// 非负整数
    Integer,
    /// 有符号整数（例如群组ID）
    SignedInteger,
    /// 时长（整数秒），导入时也接受 "4m" 这类简写
    Duration,
    /// 字符串
    String,
    /// 字符串枚举，大小写敏感
    Enum(&'static [&'static str]),
    /// 整数编码枚举
    Code(&'static [i64]),
    /// 对象列表
    ListOf(Vec<FieldSpec>),
    /// 嵌套对象
    Object(Vec<FieldSpec>),
    /// 键取自固定集合的对象，每个键对应同一种条目结构
    KeyedObject {
        keys: &'static [&'static str],
        entry: Vec<FieldSpec>,
    },
}

/// 跨字段不变量
#[derive(Debug, Clone, PartialEq)]
pub enum Invariant {
    /// 当同一对象中 `action_field` 取值属于 `timed` 时，本字段必须为正；
    /// 否则本字段无意义，规范化为 0。
    PositiveWhenTimed {
        action_field: &'static str,
        timed: &'static [&'static str],
    },
}

/// 字段定义
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// 字段名（路径中的一段）
    pub name: &'static str,
    /// 字段类型
    pub kind: FieldKind,
    /// 是否允许 null（与空列表等价）
    pub nullable: bool,
    /// 缺失时是否报告 `missing_required`
    pub required: bool,
    /// 叶子字段的默认值；复合字段的默认值由子字段推导
    default: Value,
    /// 跨字段不变量
    pub invariant: Option<Invariant>,
}

impl FieldSpec {
    fn leaf(name: &'static str, kind: FieldKind, default: Value) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            required: false,
            default,
            invariant: None,
        }
    }

    pub fn bool(name: &'static str, default: bool) -> Self {
        Self::leaf(name, FieldKind::Bool, Value::Bool(default))
    }

    pub fn integer(name: &'static str, default: u64) -> Self {
        Self::leaf(name, FieldKind::Integer, Value::from(default))
    }

    pub fn signed(name: &'static str, default: i64) -> Self {
        Self::leaf(name, FieldKind::SignedInteger, Value::from(default))
    }

    /// 时长字段，接受整数秒或简写字符串
    pub fn duration(name: &'static str, default: u64) -> Self {
        Self::leaf(name, FieldKind::Duration, Value::from(default))
    }

    pub fn string(name: &'static str, default: &str) -> Self {
        Self::leaf(name, FieldKind::String, Value::String(default.to_string()))
    }

    pub fn enumeration(
        name: &'static str,
        values: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self::leaf(name, FieldKind::Enum(values), Value::String(default.to_string()))
    }

    pub fn code(name: &'static str, codes: &'static [i64], default: i64) -> Self {
        Self::leaf(name, FieldKind::Code(codes), Value::from(default))
    }

    /// 可空的对象列表，null 与 [] 等价
    pub fn list(name: &'static str, item: Vec<FieldSpec>) -> Self {
        Self {
            nullable: true,
            ..Self::leaf(name, FieldKind::ListOf(item), Value::Null)
        }
    }

    pub fn object(name: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self::leaf(name, FieldKind::Object(fields), Value::Null)
    }

    pub fn keyed(
        name: &'static str,
        keys: &'static [&'static str],
        entry: Vec<FieldSpec>,
    ) -> Self {
        Self::leaf(name, FieldKind::KeyedObject { keys, entry }, Value::Null)
    }

    /// 标记为必填
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// 附加不变量
    pub fn with_invariant(mut self, invariant: Invariant) -> Self {
        self.invariant = Some(invariant);
        self
    }

    /// 计算字段的完整默认值
    pub fn default_value(&self) -> Value {
        match &self.kind {
            FieldKind::ListOf(_) => Value::Array(Vec::new()),
            FieldKind::Object(fields) => Value::Object(default_object(fields)),
            FieldKind::KeyedObject { keys, entry } => {
                let entry_default = default_object(entry);
                Value::Object(
                    keys.iter()
                        .map(|key| (key.to_string(), Value::Object(entry_default.clone())))
                        .collect(),
                )
            }
            _ => self.default.clone(),
        }
    }
}

/// 由字段列表生成默认对象
pub fn default_object(fields: &[FieldSpec]) -> Map<String, Value> {
    fields
        .iter()
        .map(|field| (field.name.to_string(), field.default_value()))
        .collect()
}

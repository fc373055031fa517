//! 校验器
//!
//! 按注册表中的字段定义校验原始值：收集全部问题而不是遇错即停，
//! 缺失字段以默认值填充，未知键报告后丢弃，最终得到尽力规范化的值。

use crate::duration::parse_duration;
use crate::model::ModuleName;
use crate::schema::field::{default_object, FieldKind, FieldSpec, Invariant};
use crate::schema::SchemaRegistry;
use crate::validation::violation::{Validation, Violation, ViolationKind};
use serde_json::{Map, Value};

/// 校验器，只读地借用注册表
#[derive(Debug, Clone, Copy)]
pub struct Validator<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> Validator<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// 校验单个模块
    ///
    /// # 参数
    /// * `module` - 模块名
    /// * `raw` - 原始值
    ///
    /// # 返回
    /// * `Validation` - 规范化后的模块设置与问题列表
    pub fn validate(&self, module: ModuleName, raw: &Value) -> Validation {
        let spec = self.registry.module(module);
        let mut violations = Vec::new();
        let normalized = validate_object(&spec.fields, raw, module.as_str(), &mut violations);
        tracing::debug!(
            module = module.as_str(),
            violations = violations.len(),
            "模块校验完成"
        );
        Validation {
            normalized: Value::Object(normalized),
            violations,
        }
    }

    /// 校验整个 `data` 映射
    ///
    /// 每个模块独立校验，一个模块出错不影响其他模块的规范化。
    /// 缺失的模块报告 `missing_required` 并以默认值填充。
    pub fn validate_data(&self, data: &Map<String, Value>) -> Validation {
        let mut violations = Vec::new();
        let mut normalized = Map::new();

        for module in ModuleName::ALL {
            match data.get(module.as_str()) {
                Some(raw) => {
                    let result = self.validate(*module, raw);
                    violations.extend(result.violations);
                    normalized.insert(module.as_str().to_string(), result.normalized);
                }
                None => {
                    violations.push(Violation::new(
                        module.as_str(),
                        ViolationKind::MissingRequired,
                        "缺少模块设置，已使用默认值",
                    ));
                    normalized.insert(
                        module.as_str().to_string(),
                        Value::Object(self.registry.defaults(*module)),
                    );
                }
            }
        }

        for key in data.keys() {
            if key.parse::<ModuleName>().is_err() {
                violations.push(Violation::new(
                    key.as_str(),
                    ViolationKind::UnknownKey,
                    "未知的模块，已忽略",
                ));
            }
        }

        Validation {
            normalized: Value::Object(normalized),
            violations,
        }
    }
}

fn join(path: &str, name: &str) -> String {
    format!("{}.{}", path, name)
}

/// JSON值的类型名，用于问题说明
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(path: &str, expected: &str, found: &Value) -> Violation {
    Violation::new(
        path,
        ViolationKind::TypeMismatch,
        format!("期望 {}，实际为 {}", expected, type_name(found)),
    )
}

/// 校验对象，返回规范化后的对象
fn validate_object(
    fields: &[FieldSpec],
    raw: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Map<String, Value> {
    let Some(object) = raw.as_object() else {
        violations.push(mismatch(path, "object", raw));
        return default_object(fields);
    };

    let mut normalized = Map::new();
    for field in fields {
        let field_path = join(path, field.name);
        let value = match object.get(field.name) {
            Some(value) => validate_field(field, value, &field_path, violations),
            None => {
                if field.required {
                    violations.push(Violation::new(
                        &field_path,
                        ViolationKind::MissingRequired,
                        "缺少必填字段",
                    ));
                }
                field.default_value()
            }
        };
        normalized.insert(field.name.to_string(), value);
    }

    for key in object.keys() {
        if !fields.iter().any(|field| field.name == key) {
            violations.push(Violation::new(
                join(path, key),
                ViolationKind::UnknownKey,
                "未知的字段，已忽略",
            ));
        }
    }

    apply_invariants(fields, &mut normalized, path, violations);
    normalized
}

/// 在字段全部规范化之后检查跨字段不变量
fn apply_invariants(
    fields: &[FieldSpec],
    normalized: &mut Map<String, Value>,
    path: &str,
    violations: &mut Vec<Violation>,
) {
    for field in fields {
        let Some(Invariant::PositiveWhenTimed {
            action_field,
            timed,
        }) = &field.invariant
        else {
            continue;
        };

        let action = normalized
            .get(*action_field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let duration = normalized.get(field.name).and_then(Value::as_u64).unwrap_or(0);

        if timed.contains(&action.as_str()) {
            if duration == 0 {
                violations.push(Violation::new(
                    join(path, field.name),
                    ViolationKind::InvariantViolated,
                    format!("动作 {} 需要正数时长", action),
                ));
            }
        } else if duration != 0 {
            // 非限时动作忽略时长
            normalized.insert(field.name.to_string(), Value::from(0u64));
        }
    }
}

/// 校验单个字段，失败时返回默认值
fn validate_field(
    field: &FieldSpec,
    value: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Value {
    if value.is_null() {
        if !field.nullable {
            violations.push(mismatch(path, "non-null", value));
        }
        return field.default_value();
    }

    match &field.kind {
        FieldKind::Bool => match value {
            Value::Bool(_) => value.clone(),
            _ => {
                violations.push(mismatch(path, "bool", value));
                field.default_value()
            }
        },
        FieldKind::Integer => match value.as_u64() {
            Some(n) => Value::from(n),
            None => {
                violations.push(mismatch(path, "non-negative integer", value));
                field.default_value()
            }
        },
        FieldKind::SignedInteger => match value.as_i64() {
            Some(n) => Value::from(n),
            None => {
                violations.push(mismatch(path, "integer", value));
                field.default_value()
            }
        },
        FieldKind::Duration => match value {
            Value::Number(_) => match value.as_u64() {
                Some(n) => Value::from(n),
                None => {
                    violations.push(mismatch(path, "seconds", value));
                    field.default_value()
                }
            },
            Value::String(text) => match parse_duration(text) {
                Ok(seconds) => Value::from(seconds),
                Err(err) => {
                    violations.push(Violation::new(
                        path,
                        ViolationKind::TypeMismatch,
                        err.to_string(),
                    ));
                    field.default_value()
                }
            },
            _ => {
                violations.push(mismatch(path, "seconds", value));
                field.default_value()
            }
        },
        FieldKind::String => match value {
            Value::String(_) => value.clone(),
            _ => {
                violations.push(mismatch(path, "string", value));
                field.default_value()
            }
        },
        FieldKind::Enum(allowed) => match value.as_str() {
            Some(text) if allowed.contains(&text) => value.clone(),
            Some(text) => {
                violations.push(Violation::new(
                    path,
                    ViolationKind::UnknownEnumValue,
                    format!("未知取值 {:?}，允许: {}", text, allowed.join("/")),
                ));
                field.default_value()
            }
            None => {
                violations.push(mismatch(path, "string", value));
                field.default_value()
            }
        },
        FieldKind::Code(codes) => match value.as_i64() {
            Some(code) if codes.contains(&code) => Value::from(code),
            Some(code) => {
                violations.push(Violation::new(
                    path,
                    ViolationKind::UnknownEnumValue,
                    format!("未知编码 {}", code),
                ));
                field.default_value()
            }
            None => {
                violations.push(mismatch(path, "integer code", value));
                field.default_value()
            }
        },
        FieldKind::Object(children) => {
            Value::Object(validate_object(children, value, path, violations))
        }
        FieldKind::ListOf(item) => match value.as_array() {
            Some(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, raw)| {
                        let item_path = format!("{}[{}]", path, index);
                        Value::Object(validate_object(item, raw, &item_path, violations))
                    })
                    .collect(),
            ),
            None => {
                violations.push(mismatch(path, "array", value));
                field.default_value()
            }
        },
        FieldKind::KeyedObject { keys, entry } => {
            let Some(object) = value.as_object() else {
                violations.push(mismatch(path, "object", value));
                return field.default_value();
            };

            let mut normalized = Map::new();
            for key in keys.iter() {
                let entry_path = join(path, key);
                let entry_value = match object.get(*key) {
                    Some(raw) => validate_object(entry, raw, &entry_path, violations),
                    None => default_object(entry),
                };
                normalized.insert(key.to_string(), Value::Object(entry_value));
            }
            for key in object.keys() {
                if !keys.contains(&key.as_str()) {
                    violations.push(Violation::new(
                        join(path, key),
                        ViolationKind::UnknownKey,
                        "不在固定集合中的键，已丢弃",
                    ));
                }
            }
            Value::Object(normalized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builtin().unwrap()
    }

    fn kinds(validation: &Validation) -> Vec<(String, ViolationKind)> {
        validation
            .violations
            .iter()
            .map(|v| (v.path.clone(), v.kind))
            .collect()
    }

    #[test]
    fn test_missing_fields_are_defaulted() {
        let registry = registry();
        let validator = Validator::new(&registry);
        let result = validator.validate(ModuleName::Warns, &json!({}));
        assert!(result.is_clean());
        assert_eq!(
            result.normalized,
            json!({"action": "mute", "action_duration": 0, "warn_for": 0, "warn_limit": 3})
        );
    }

    #[test]
    fn test_non_timed_action_zeroes_duration() {
        let registry = registry();
        let validator = Validator::new(&registry);
        let result = validator.validate(
            ModuleName::Antiflood,
            &json!({"action": "mute", "action_duration": 600}),
        );
        assert!(result.is_clean());
        assert_eq!(result.normalized["action_duration"], json!(0));
    }

    #[test]
    fn test_timed_action_requires_duration() {
        let registry = registry();
        let validator = Validator::new(&registry);
        let result = validator.validate(
            ModuleName::Antiflood,
            &json!({"action": "tmute", "action_duration": 0}),
        );
        assert_eq!(
            kinds(&result),
            vec![(
                "antiflood.action_duration".to_string(),
                ViolationKind::InvariantViolated
            )]
        );
        assert_eq!(result.normalized["action"], json!("tmute"));
    }

    #[test]
    fn test_shorthand_duration_is_parsed() {
        let registry = registry();
        let validator = Validator::new(&registry);
        let result = validator.validate(
            ModuleName::Warns,
            &json!({"action": "tban", "action_duration": "3h", "warn_for": "4m"}),
        );
        assert!(result.is_clean());
        assert_eq!(result.normalized["warn_for"], json!(240));
        assert_eq!(result.normalized["action_duration"], json!(10_800));
    }

    #[test]
    fn test_every_duration_field_accepts_shorthand() {
        let registry = registry();
        let validator = Validator::new(&registry);

        let raids = validator.validate(
            ModuleName::Raids,
            &json!({"raid_mode_action_duration": "1h", "raid_mode_duration": "1d", "raid_mode_auto_limit": 5}),
        );
        assert!(raids.is_clean());
        assert_eq!(raids.normalized["raid_mode_action_duration"], json!(3_600));
        assert_eq!(raids.normalized["raid_mode_duration"], json!(86_400));

        let greetings = validator.validate(
            ModuleName::Greetings,
            &json!({"kick_after": "5m", "mute_for": "1w"}),
        );
        assert!(greetings.is_clean());
        assert_eq!(greetings.normalized["kick_after"], json!(300));
        assert_eq!(greetings.normalized["mute_for"], json!(604_800));

        let antiflood = validator.validate(ModuleName::Antiflood, &json!({"flood_timer": "30s"}));
        assert!(antiflood.is_clean());
        assert_eq!(antiflood.normalized["flood_timer"], json!(30));
    }

    #[test]
    fn test_unparseable_duration_is_type_mismatch() {
        let registry = registry();
        let validator = Validator::new(&registry);
        let result = validator.validate(ModuleName::Warns, &json!({"warn_for": "4 minutes"}));
        assert_eq!(
            kinds(&result),
            vec![("warns.warn_for".to_string(), ViolationKind::TypeMismatch)]
        );
        assert_eq!(result.normalized["warn_for"], json!(0));
    }

    #[test]
    fn test_enum_matching_is_case_sensitive() {
        let registry = registry();
        let validator = Validator::new(&registry);
        let result = validator.validate(ModuleName::Warns, &json!({"action": "Ban"}));
        assert_eq!(
            kinds(&result),
            vec![("warns.action".to_string(), ViolationKind::UnknownEnumValue)]
        );
        assert_eq!(result.normalized["action"], json!("mute"));
    }

    #[test]
    fn test_unknown_lock_is_dropped() {
        let registry = registry();
        let validator = Validator::new(&registry);
        let result = validator.validate(
            ModuleName::Locks,
            &json!({"locks": {"teleport": {"locked": true, "reason": ""}, "url": {"locked": true}}}),
        );
        assert_eq!(
            kinds(&result),
            vec![("locks.locks.teleport".to_string(), ViolationKind::UnknownKey)]
        );
        let locks = result.normalized["locks"].as_object().unwrap();
        assert!(locks.get("teleport").is_none());
        assert_eq!(locks.len(), 42);
        assert_eq!(locks["url"], json!({"locked": true, "reason": ""}));
    }

    #[test]
    fn test_null_and_empty_list_are_equivalent() {
        let registry = registry();
        let validator = Validator::new(&registry);
        let from_null = validator.validate(ModuleName::Notes, &json!({"notes": null}));
        let from_empty = validator.validate(ModuleName::Notes, &json!({"notes": []}));
        assert!(from_null.is_clean());
        assert_eq!(from_null, from_empty);
    }

    #[test]
    fn test_null_on_non_nullable_field() {
        let registry = registry();
        let validator = Validator::new(&registry);
        let result = validator.validate(ModuleName::Rules, &json!({"content": null}));
        assert_eq!(
            kinds(&result),
            vec![("rules.content".to_string(), ViolationKind::TypeMismatch)]
        );
    }

    #[test]
    fn test_collects_every_violation() {
        let registry = registry();
        let validator = Validator::new(&registry);
        let result = validator.validate(
            ModuleName::Filters,
            &json!({"filters": [
                {"data_id": "", "name": "hi", "text": "hello", "type": 0},
                {"data_id": "", "text": 5, "type": 77, "extra": true}
            ]}),
        );
        assert_eq!(
            kinds(&result),
            vec![
                ("filters.filters[1].name".to_string(), ViolationKind::MissingRequired),
                ("filters.filters[1].text".to_string(), ViolationKind::TypeMismatch),
                ("filters.filters[1].type".to_string(), ViolationKind::UnknownEnumValue),
                ("filters.filters[1].extra".to_string(), ViolationKind::UnknownKey),
            ]
        );
        assert_eq!(result.normalized["filters"][0]["name"], json!("hi"));
        assert_eq!(result.normalized["filters"][1]["type"], json!(0));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let registry = registry();
        let validator = Validator::new(&registry);
        let first = validator.validate(
            ModuleName::Greetings,
            &json!({"mute_for": "1h", "welcome": {"text": "hi", "type": 4}, "bogus": 1}),
        );
        let second = validator.validate(ModuleName::Greetings, &first.normalized);
        assert!(second.is_clean());
        assert_eq!(second.normalized, first.normalized);
    }

    #[test]
    fn test_negative_integer_is_type_mismatch() {
        let registry = registry();
        let validator = Validator::new(&registry);
        let result = validator.validate(ModuleName::Warns, &json!({"warn_limit": -1}));
        assert_eq!(
            kinds(&result),
            vec![("warns.warn_limit".to_string(), ViolationKind::TypeMismatch)]
        );
    }

    #[test]
    fn test_validate_data_reports_missing_and_unknown_modules() {
        let registry = registry();
        let validator = Validator::new(&registry);
        let mut data = registry.all_defaults();
        data.remove("pins");
        data.insert("connections".to_string(), json!({}));
        let result = validator.validate_data(&data);
        assert_eq!(
            kinds(&result),
            vec![
                ("pins".to_string(), ViolationKind::MissingRequired),
                ("connections".to_string(), ViolationKind::UnknownKey),
            ]
        );
        assert_eq!(result.normalized, Value::Object(registry.all_defaults()));
    }
}

//! 模式注册表
//!
//! 进程级、只读的模块字段定义表。启动时显式构建一次，之后不再修改，
//! 可在任意多个并发校验之间无锁共享。

use crate::error::RegistryError;
use crate::model::ModuleName;
use crate::schema::field::{default_object, FieldKind, FieldSpec, Invariant};
use crate::schema::modules;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// 单个模块的定义
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSpec {
    /// 模块名
    pub name: ModuleName,
    /// 一句话说明，用于报告
    pub description: &'static str,
    /// 字段定义
    pub fields: Vec<FieldSpec>,
}

impl ModuleSpec {
    pub fn new(name: ModuleName, description: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self {
            name,
            description,
            fields,
        }
    }

    /// 模块的全部默认设置
    pub fn defaults(&self) -> Map<String, Value> {
        default_object(&self.fields)
    }
}

/// 模式注册表
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRegistry {
    /// 按 `ModuleName::ALL` 的顺序排列，构建时保证完整
    modules: Vec<ModuleSpec>,
}

impl SchemaRegistry {
    /// 构建内置的17模块注册表
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut builder = SchemaRegistryBuilder::default();
        for spec in modules::builtin_modules() {
            builder.register(spec)?;
        }
        builder.build()
    }

    /// 按名称查找模块定义
    pub fn lookup(&self, name: &str) -> Option<&ModuleSpec> {
        name.parse::<ModuleName>().ok().map(|module| self.module(module))
    }

    /// 获取模块定义
    pub fn module(&self, name: ModuleName) -> &ModuleSpec {
        &self.modules[name as usize]
    }

    /// 全部模块定义
    pub fn modules(&self) -> impl Iterator<Item = &ModuleSpec> {
        self.modules.iter()
    }

    /// 模块的默认设置
    pub fn defaults(&self, name: ModuleName) -> Map<String, Value> {
        self.module(name).defaults()
    }

    /// 全部模块的默认设置
    pub fn all_defaults(&self) -> Map<String, Value> {
        self.modules
            .iter()
            .map(|spec| (spec.name.as_str().to_string(), Value::Object(spec.defaults())))
            .collect()
    }
}

/// 注册表构建器
///
/// 重复模块、重复字段或引用未知字段的不变量都会在构建时直接失败。
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    modules: BTreeMap<ModuleName, ModuleSpec>,
}

impl SchemaRegistryBuilder {
    /// 注册模块
    pub fn register(&mut self, spec: ModuleSpec) -> Result<&mut Self, RegistryError> {
        if self.modules.contains_key(&spec.name) {
            return Err(RegistryError::DuplicateModule(spec.name.to_string()));
        }
        check_fields(spec.name.as_str(), &spec.fields)?;
        self.modules.insert(spec.name, spec);
        Ok(self)
    }

    /// 完成构建，要求17个模块全部注册
    pub fn build(self) -> Result<SchemaRegistry, RegistryError> {
        let mut modules = self.modules;
        let mut ordered = Vec::with_capacity(ModuleName::ALL.len());
        for name in ModuleName::ALL {
            let spec = modules
                .remove(name)
                .ok_or_else(|| RegistryError::MissingModule(name.to_string()))?;
            ordered.push(spec);
        }
        Ok(SchemaRegistry { modules: ordered })
    }
}

/// 递归检查字段定义
fn check_fields(module: &str, fields: &[FieldSpec]) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name) {
            return Err(RegistryError::DuplicateField {
                module: module.to_string(),
                field: field.name.to_string(),
            });
        }
    }

    for field in fields {
        if let Some(Invariant::PositiveWhenTimed { action_field, .. }) = &field.invariant {
            let is_enum = fields
                .iter()
                .any(|f| f.name == *action_field && matches!(f.kind, FieldKind::Enum(_)));
            if !is_enum {
                return Err(RegistryError::UnknownField {
                    module: module.to_string(),
                    field: action_field.to_string(),
                });
            }
        }

        match &field.kind {
            FieldKind::Object(children) | FieldKind::ListOf(children) => {
                check_fields(module, children)?;
            }
            FieldKind::KeyedObject { keys, entry } => {
                let mut seen_keys = HashSet::new();
                for key in keys.iter() {
                    if !seen_keys.insert(*key) {
                        return Err(RegistryError::DuplicateField {
                            module: module.to_string(),
                            field: format!("{}.{}", field.name, key),
                        });
                    }
                }
                check_fields(module, entry)?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// 全局注册表
static GLOBAL_REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();

/// 显式安装全局注册表（进程内只能执行一次）
pub fn install() -> Result<&'static SchemaRegistry, RegistryError> {
    let registry = SchemaRegistry::builtin()?;
    GLOBAL_REGISTRY
        .set(registry)
        .map_err(|_| RegistryError::AlreadyInstalled)?;
    GLOBAL_REGISTRY.get().ok_or(RegistryError::AlreadyInstalled)
}

/// 读取全局注册表，未安装时返回 `None`
pub fn global() -> Option<&'static SchemaRegistry> {
    GLOBAL_REGISTRY.get()
}

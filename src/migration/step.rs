//! 单步迁移接口

use crate::model::RawEnvelope;
use crate::schema::SchemaRegistry;
use serde_json::{Map, Value};

/// 相邻两个版本之间的迁移步骤
///
/// 每一步都是 `data` 映射上的纯变换。新增版本时只需实现一个新步骤。
pub trait MigrationStep: Send + Sync {
    /// 源版本
    fn from_version(&self) -> u32;

    /// 目标版本
    fn to_version(&self) -> u32 {
        self.from_version() + 1
    }

    /// 升级 `from_version -> to_version`
    ///
    /// # 参数
    /// * `envelope` - 待迁移的信封，`data` 与 `retired` 可被修改
    /// * `registry` - 用于填充新增模块的默认值
    ///
    /// # 返回
    /// * `Result<(), String>` - 失败原因
    fn upgrade(&self, envelope: &mut RawEnvelope, registry: &SchemaRegistry)
        -> Result<(), String>;

    /// 尽力降级 `to_version -> from_version`，不保证无损
    fn downgrade(
        &self,
        envelope: &mut RawEnvelope,
        registry: &SchemaRegistry,
    ) -> Result<(), String>;
}

/// 取嵌套对象的可变引用
pub(crate) fn object_at<'a>(
    data: &'a mut Map<String, Value>,
    path: &[&str],
) -> Option<&'a mut Map<String, Value>> {
    let mut current = data;
    for segment in path {
        current = current.get_mut(*segment)?.as_object_mut()?;
    }
    Some(current)
}

/// 重命名对象中的键
///
/// 新旧键同时存在且取值不同时保留新键，返回被挤掉的旧值。
pub(crate) fn rename_key(object: &mut Map<String, Value>, from: &str, to: &str) -> Option<Value> {
    let value = object.remove(from)?;
    match object.get(to) {
        Some(existing) if *existing != value => Some(value),
        Some(_) => None,
        None => {
            object.insert(to.to_string(), value);
            None
        }
    }
}

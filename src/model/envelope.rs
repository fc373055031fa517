//! 导出信封
//!
//! 顶层的版本化交换单元：`bot_id`、`version` 与 `data`。

use crate::model::settings::BotData;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// 当前模式版本
pub const CURRENT_VERSION: u32 = 2;

/// 迁移链能识别的最早版本
pub const MIN_VERSION: u32 = 1;

/// 已解码但尚未校验的信封，迁移在此形态上进行
#[derive(Debug, Clone, PartialEq)]
pub struct RawEnvelope {
    /// 导出方机器人ID
    pub bot_id: u64,
    /// 模式版本
    pub version: u32,
    /// 模块名到原始设置的映射
    pub data: Map<String, Value>,
    /// 迁移中被移除的模块数据，不写入线上格式
    pub retired: BTreeMap<String, Value>,
}

impl RawEnvelope {
    pub fn new(bot_id: u64, version: u32, data: Map<String, Value>) -> Self {
        Self {
            bot_id,
            version,
            data,
            retired: BTreeMap::new(),
        }
    }
}

/// 规范化后的信封
///
/// 只有经过校验的信封才能导出；通过 [`Envelope::data_mut`] 修改数据会清除校验标记。
#[derive(Debug, Clone)]
pub struct Envelope {
    bot_id: u64,
    version: u32,
    data: BotData,
    retired: BTreeMap<String, Value>,
    validated: bool,
}

impl Envelope {
    /// 由调用方构造的信封，尚未校验
    pub fn new(bot_id: u64, data: BotData) -> Self {
        Self {
            bot_id,
            version: CURRENT_VERSION,
            data,
            retired: BTreeMap::new(),
            validated: false,
        }
    }

    pub(crate) fn validated(bot_id: u64, data: BotData, retired: BTreeMap<String, Value>) -> Self {
        Self {
            bot_id,
            version: CURRENT_VERSION,
            data,
            retired,
            validated: true,
        }
    }

    pub fn bot_id(&self) -> u64 {
        self.bot_id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn data(&self) -> &BotData {
        &self.data
    }

    /// 可变访问数据，之后必须重新校验才能导出
    pub fn data_mut(&mut self) -> &mut BotData {
        self.validated = false;
        &mut self.data
    }

    /// 迁移中保留下来的已移除模块数据
    pub fn retired(&self) -> &BTreeMap<String, Value> {
        &self.retired
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub fn into_parts(self) -> (u64, BotData, BTreeMap<String, Value>) {
        (self.bot_id, self.data, self.retired)
    }
}

/// 只比较线上可见的内容
impl PartialEq for Envelope {
    fn eq(&self, other: &Self) -> bool {
        self.bot_id == other.bot_id && self.version == other.version && self.data == other.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_envelope_is_unvalidated() {
        let envelope = Envelope::new(42, BotData::default());
        assert!(!envelope.is_validated());
        assert_eq!(envelope.version(), CURRENT_VERSION);
    }

    #[test]
    fn test_data_mut_clears_validation() {
        let mut envelope = Envelope::validated(42, BotData::default(), BTreeMap::new());
        assert!(envelope.is_validated());
        envelope.data_mut().reports.disable_reports = true;
        assert!(!envelope.is_validated());
    }

    #[test]
    fn test_equality_ignores_validation_state() {
        let sealed = Envelope::validated(7, BotData::default(), BTreeMap::new());
        let fresh = Envelope::new(7, BotData::default());
        assert_eq!(sealed, fresh);
    }
}

//! 信封组装器
//!
//! 组合编解码、迁移与校验，对外提供导入和导出两个操作：
//!
//! - 导入：解码 -> 迁移到当前版本 -> 逐模块校验 -> 规范化信封 + 问题列表
//! - 导出：复检 -> 编码（可选降级到旧版本）
//!
//! 整个过程是纯计算，不做任何IO；注册表只读共享，可并发调用。

use crate::codec;
use crate::config::EngineConfig;
use crate::error::{ConfigPortError, ExportError, Result};
use crate::migration::Migrator;
use crate::model::{BotData, Envelope, RawEnvelope, CURRENT_VERSION};
use crate::report::ViolationReport;
use crate::schema::SchemaRegistry;
use crate::validation::{Validator, Violation};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::time::Instant;

/// 导入结果：规范化信封与全部校验问题，由调用方决定问题是否致命
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    /// 规范化后的信封
    pub envelope: Envelope,
    /// 校验问题
    pub violations: Vec<Violation>,
}

impl ImportOutcome {
    /// 是否没有任何问题
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// 配置导入导出器
pub struct ConfigPorter<'r> {
    registry: &'r SchemaRegistry,
    validator: Validator<'r>,
    migrator: Migrator<'r>,
    config: EngineConfig,
}

impl<'r> ConfigPorter<'r> {
    /// 创建导入导出器
    ///
    /// # 参数
    /// * `registry` - 只读模式注册表
    /// * `config` - 引擎配置
    pub fn new(registry: &'r SchemaRegistry, config: EngineConfig) -> Self {
        Self {
            registry,
            validator: Validator::new(registry),
            migrator: Migrator::standard(registry),
            config,
        }
    }

    /// 使用默认配置创建
    pub fn with_defaults(registry: &'r SchemaRegistry) -> Self {
        Self::new(registry, EngineConfig::default())
    }

    /// 使用自定义迁移链
    pub fn with_migrator(mut self, migrator: Migrator<'r>) -> Self {
        self.migrator = migrator;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 导入配置
    ///
    /// # 参数
    /// * `bytes` - 线上JSON
    ///
    /// # 返回
    /// * `Result<ImportOutcome>` - 规范化信封与问题列表；
    ///   编解码与迁移错误是致命的，严格模式下校验问题也是致命的
    pub fn import_config(&self, bytes: &[u8]) -> Result<ImportOutcome> {
        let started = Instant::now();

        let raw = codec::decode(bytes, self.config.import.max_input_bytes)?;
        let source_version = raw.version;
        let raw = self.migrator.migrate(raw, CURRENT_VERSION)?;
        let outcome = self.seal(raw)?;

        crate::logging::LoggingSystem::import_log(
            outcome.envelope.bot_id(),
            source_version,
            outcome.violations.len(),
            started.elapsed(),
        );

        if !outcome.is_clean() {
            tracing::warn!(
                bot_id = outcome.envelope.bot_id(),
                violations = outcome.violations.len(),
                "导入的配置存在校验问题"
            );
            if self.config.import.strict {
                return Err(ConfigPortError::Rejected(outcome.violations));
            }
        }

        Ok(outcome)
    }

    /// 校验调用方构造的信封，返回带校验标记的规范化信封
    pub fn validate_envelope(&self, envelope: Envelope) -> Result<ImportOutcome> {
        let (bot_id, data, retired) = envelope.into_parts();
        let data = match serde_json::to_value(&data)? {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        let mut raw = RawEnvelope::new(bot_id, CURRENT_VERSION, data);
        raw.retired = retired;
        self.seal(raw)
    }

    /// 全部模块取默认值的已校验信封
    pub fn default_envelope(&self, bot_id: u64) -> Envelope {
        Envelope::validated(bot_id, BotData::default(), BTreeMap::new())
    }

    /// 校验当前版本的原始信封并转换为强类型信封
    fn seal(&self, raw: RawEnvelope) -> Result<ImportOutcome> {
        let validation = self.validator.validate_data(&raw.data);
        let data: BotData = serde_json::from_value(validation.normalized)?;
        Ok(ImportOutcome {
            envelope: Envelope::validated(raw.bot_id, data, raw.retired),
            violations: validation.violations,
        })
    }

    /// 导出配置
    ///
    /// 未经校验的信封直接拒绝；导出前再次校验，`require_clean` 时发现问题即拒绝。
    ///
    /// # 参数
    /// * `envelope` - 已校验的信封
    ///
    /// # 返回
    /// * `Result<Vec<u8>>` - 线上JSON
    pub fn export_config(&self, envelope: &Envelope) -> Result<Vec<u8>> {
        if !envelope.is_validated() {
            return Err(ExportError::NotValidated.into());
        }

        let data = match serde_json::to_value(envelope.data()).map_err(ExportError::Encode)? {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        let recheck = self.validator.validate_data(&data);
        if !recheck.is_clean() && self.config.export.require_clean {
            tracing::warn!(
                bot_id = envelope.bot_id(),
                violations = recheck.violations.len(),
                "导出前复检失败"
            );
            return Err(ExportError::Invalid(recheck.violations).into());
        }

        let pretty = self.config.export.pretty;
        let target = self.config.export.target_version;
        let bytes = if target == CURRENT_VERSION {
            codec::encode(envelope, pretty).map_err(ExportError::Encode)?
        } else {
            let mut raw = RawEnvelope::new(envelope.bot_id(), CURRENT_VERSION, data);
            raw.retired = envelope.retired().clone();
            let downgraded = self.migrator.migrate(raw, target)?;
            codec::encode_raw(&downgraded, pretty).map_err(ExportError::Encode)?
        };

        tracing::info!(
            bot_id = envelope.bot_id(),
            version = target,
            bytes = bytes.len(),
            "配置导出完成"
        );
        Ok(bytes)
    }

    /// 信封规范编码的SHA-256指纹（小写十六进制）
    ///
    /// 只取决于线上可见内容，与 `pretty` 设置无关，可用于缓存和比对。
    pub fn fingerprint(&self, envelope: &Envelope) -> Result<String> {
        let bytes = codec::encode(envelope, false).map_err(ExportError::Encode)?;
        let digest = Sha256::digest(&bytes);
        Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// 为问题列表生成报告，优先使用配置中的模板
    pub fn report(&self, violations: &[Violation]) -> anyhow::Result<String> {
        let report = ViolationReport::new(violations, self.registry);
        match self.config.report.template {
            Some(ref template) => report.render_with(template),
            None => report.render(),
        }
    }
}

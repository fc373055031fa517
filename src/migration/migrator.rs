//! 迁移链
//!
//! 按顺序组合相邻版本之间的迁移步骤。`n -> m` 的迁移依次执行每个中间步骤；
//! 链外的版本号一律报错，绝不静默跳过。

use crate::error::MigrationError;
use crate::migration::step::MigrationStep;
use crate::migration::v1_to_v2::V1ToV2;
use crate::model::{RawEnvelope, MIN_VERSION};
use crate::schema::SchemaRegistry;
use std::ops::RangeInclusive;

/// 版本迁移器
pub struct Migrator<'r> {
    registry: &'r SchemaRegistry,
    /// 第 i 个步骤迁移 `MIN_VERSION + i -> MIN_VERSION + i + 1`
    steps: Vec<Box<dyn MigrationStep>>,
}

impl<'r> Migrator<'r> {
    /// 内置迁移链
    pub fn standard(registry: &'r SchemaRegistry) -> Self {
        let steps: Vec<Box<dyn MigrationStep>> = vec![Box::new(V1ToV2)];
        Self { registry, steps }
    }

    /// 使用自定义步骤构建迁移链，步骤必须从 `MIN_VERSION` 起首尾相接
    pub fn with_steps(
        registry: &'r SchemaRegistry,
        steps: Vec<Box<dyn MigrationStep>>,
    ) -> Result<Self, MigrationError> {
        for (index, step) in steps.iter().enumerate() {
            let expected = MIN_VERSION + index as u32;
            if step.from_version() != expected || step.to_version() != expected + 1 {
                return Err(MigrationError::NoPath {
                    from: expected,
                    to: expected + 1,
                });
            }
        }
        Ok(Self { registry, steps })
    }

    /// 迁移链的最新版本
    pub fn latest_version(&self) -> u32 {
        MIN_VERSION + self.steps.len() as u32
    }

    /// 迁移链能识别的全部版本
    pub fn known_versions(&self) -> RangeInclusive<u32> {
        MIN_VERSION..=self.latest_version()
    }

    fn check_known(&self, version: u32) -> Result<(), MigrationError> {
        if self.known_versions().contains(&version) {
            Ok(())
        } else {
            Err(MigrationError::UnknownVersion(version))
        }
    }

    fn step_from(&self, version: u32) -> Result<&dyn MigrationStep, MigrationError> {
        let index = version
            .checked_sub(MIN_VERSION)
            .ok_or(MigrationError::UnknownVersion(version))? as usize;
        self.steps
            .get(index)
            .map(|step| &**step)
            .ok_or(MigrationError::NoPath {
                from: version,
                to: version + 1,
            })
    }

    /// 将信封迁移到目标版本
    ///
    /// # 参数
    /// * `envelope` - 原始信封
    /// * `target` - 目标版本
    ///
    /// # 返回
    /// * `Result<RawEnvelope, MigrationError>` - 迁移后的信封
    pub fn migrate(
        &self,
        mut envelope: RawEnvelope,
        target: u32,
    ) -> Result<RawEnvelope, MigrationError> {
        self.check_known(envelope.version)?;
        self.check_known(target)?;

        while envelope.version < target {
            let from = envelope.version;
            let step = self.step_from(from)?;
            step.upgrade(&mut envelope, self.registry)
                .map_err(|reason| MigrationError::StepFailed {
                    from,
                    to: from + 1,
                    reason,
                })?;
            envelope.version = step.to_version();
            tracing::info!(from, to = envelope.version, "已应用升级步骤");
        }

        while envelope.version > target {
            let to = envelope.version - 1;
            let step = self.step_from(to)?;
            step.downgrade(&mut envelope, self.registry)
                .map_err(|reason| MigrationError::StepFailed {
                    from: to + 1,
                    to,
                    reason,
                })?;
            envelope.version = to;
            tracing::info!(from = to + 1, to, "已应用降级步骤");
        }

        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CURRENT_VERSION;
    use serde_json::{json, Map};

    struct Noop(u32);

    impl MigrationStep for Noop {
        fn from_version(&self) -> u32 {
            self.0
        }

        fn upgrade(&self, _: &mut RawEnvelope, _: &SchemaRegistry) -> Result<(), String> {
            Ok(())
        }

        fn downgrade(&self, _: &mut RawEnvelope, _: &SchemaRegistry) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn test_standard_chain_reaches_current_version() {
        let registry = SchemaRegistry::builtin().unwrap();
        let migrator = Migrator::standard(&registry);
        assert_eq!(migrator.latest_version(), CURRENT_VERSION);
        assert_eq!(migrator.known_versions(), 1..=2);
    }

    #[test]
    fn test_unknown_versions_are_fatal() {
        let registry = SchemaRegistry::builtin().unwrap();
        let migrator = Migrator::standard(&registry);

        let future = RawEnvelope::new(1, 3, Map::new());
        assert_eq!(
            migrator.migrate(future, 2).unwrap_err(),
            MigrationError::UnknownVersion(3)
        );

        let current = RawEnvelope::new(1, 2, Map::new());
        assert_eq!(
            migrator.migrate(current, 9).unwrap_err(),
            MigrationError::UnknownVersion(9)
        );
    }

    #[test]
    fn test_same_version_is_identity() {
        let registry = SchemaRegistry::builtin().unwrap();
        let migrator = Migrator::standard(&registry);
        let data = json!({"warns": {"warn_limit": 5}}).as_object().cloned().unwrap();
        let envelope = RawEnvelope::new(1, 2, data);
        let migrated = migrator.migrate(envelope.clone(), 2).unwrap();
        assert_eq!(migrated, envelope);
    }

    #[test]
    fn test_upgrade_then_downgrade() {
        let registry = SchemaRegistry::builtin().unwrap();
        let migrator = Migrator::standard(&registry);
        let envelope = RawEnvelope::new(1, 1, Map::new());

        let upgraded = migrator.migrate(envelope, 2).unwrap();
        assert_eq!(upgraded.version, 2);
        assert!(upgraded.data.contains_key("federations"));

        let downgraded = migrator.migrate(upgraded, 1).unwrap();
        assert_eq!(downgraded.version, 1);
        assert!(!downgraded.data.contains_key("federations"));
        assert!(downgraded.retired.contains_key("federations"));
    }

    struct Failing;

    impl MigrationStep for Failing {
        fn from_version(&self) -> u32 {
            1
        }

        fn upgrade(&self, _: &mut RawEnvelope, _: &SchemaRegistry) -> Result<(), String> {
            Err("无法转换".to_string())
        }

        fn downgrade(&self, _: &mut RawEnvelope, _: &SchemaRegistry) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn test_step_failure_is_reported() {
        let registry = SchemaRegistry::builtin().unwrap();
        let steps: Vec<Box<dyn MigrationStep>> = vec![Box::new(Failing)];
        let migrator = Migrator::with_steps(&registry, steps).unwrap();
        let err = migrator.migrate(RawEnvelope::new(1, 1, Map::new()), 2).unwrap_err();
        assert!(matches!(err, MigrationError::StepFailed { from: 1, to: 2, .. }));
    }

    #[test]
    fn test_conflicting_fields_do_not_abort_migration() {
        let registry = SchemaRegistry::builtin().unwrap();
        let migrator = Migrator::standard(&registry);
        let data = json!({"warns": {"warn_time": 60, "warn_for": 120}, "rules": {"content": "keep me"}})
            .as_object()
            .cloned()
            .unwrap();
        let migrated = migrator.migrate(RawEnvelope::new(1, 1, data), 2).unwrap();
        assert_eq!(migrated.version, 2);
        assert_eq!(migrated.data["warns"]["warn_for"], json!(120));
        assert_eq!(migrated.data["rules"]["content"], json!("keep me"));
        assert_eq!(migrated.retired["warns.warn_time"], json!(60));
    }

    #[test]
    fn test_downgrade_then_upgrade_keeps_federations() {
        let registry = SchemaRegistry::builtin().unwrap();
        let migrator = Migrator::standard(&registry);
        let data = json!({"federations": {"fed_id": "abc", "quiet_ban": true}})
            .as_object()
            .cloned()
            .unwrap();
        let original = RawEnvelope::new(1, 2, data);

        let downgraded = migrator.migrate(original.clone(), 1).unwrap();
        assert!(!downgraded.data.contains_key("federations"));

        let upgraded = migrator.migrate(downgraded, 2).unwrap();
        assert_eq!(upgraded, original);
    }

    #[test]
    fn test_custom_chain_must_be_contiguous() {
        let registry = SchemaRegistry::builtin().unwrap();
        let contiguous: Vec<Box<dyn MigrationStep>> = vec![Box::new(Noop(1)), Box::new(Noop(2))];
        assert!(Migrator::with_steps(&registry, contiguous).is_ok());

        let with_gap: Vec<Box<dyn MigrationStep>> = vec![Box::new(Noop(1)), Box::new(Noop(3))];
        let gap = Migrator::with_steps(&registry, with_gap);
        assert!(matches!(gap, Err(MigrationError::NoPath { from: 2, to: 3 })));
    }

    #[test]
    fn test_multi_step_chain_runs_every_step() {
        let registry = SchemaRegistry::builtin().unwrap();
        let steps: Vec<Box<dyn MigrationStep>> =
            vec![Box::new(V1ToV2), Box::new(Noop(2)), Box::new(Noop(3))];
        let migrator = Migrator::with_steps(&registry, steps).unwrap();
        let migrated = migrator.migrate(RawEnvelope::new(1, 1, Map::new()), 4).unwrap();
        assert_eq!(migrated.version, 4);
        assert!(migrated.data.contains_key("federations"));
    }
}

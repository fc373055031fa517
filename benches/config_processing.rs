//! 配置处理基准测试
//!
//! 测试导入、导出、迁移和校验的性能

use criterion::{criterion_group, criterion_main, Criterion};
use modbot_config::model::PunishAction;
use modbot_config::{ConfigPorter, EngineConfig, SchemaRegistry, Validator};
use std::hint::black_box;

/// v1 信封：缺少 federations，包含旧的 connections 模块
const V1_DOCUMENT: &str = r#"{
  "bot_id": 42,
  "version": 1,
  "data": {
    "antiflood": {"action": "tmute", "action_duration": "1h", "flood_limit": 8, "flood_timer": "30s"},
    "clean_service": {"service_types": ["voicechat", "pin"]},
    "connections": {"allow_connect": true},
    "locks": {"allowlisted_url": ["example.org"], "locks": {"url": {"locked": true}}},
    "notes": [{"name": "rules", "text": "be nice", "type": 0}],
    "warns": {"action": "tban", "action_duration": "2d", "warn_limit": 3, "warn_time": "4m"}
  }
}"#;

fn config_processing_benchmark(c: &mut Criterion) {
    let registry = SchemaRegistry::builtin().unwrap();
    let porter = ConfigPorter::with_defaults(&registry);

    let envelope = porter.default_envelope(42);
    let canonical = porter.export_config(&envelope).unwrap();

    c.bench_function("import_canonical", |b| {
        b.iter(|| {
            let outcome = porter.import_config(black_box(&canonical)).unwrap();
            black_box(outcome)
        });
    });

    c.bench_function("import_v1_with_migration", |b| {
        b.iter(|| {
            let outcome = porter
                .import_config(black_box(V1_DOCUMENT.as_bytes()))
                .unwrap();
            black_box(outcome)
        });
    });

    c.bench_function("export_canonical", |b| {
        b.iter(|| {
            let bytes = porter.export_config(black_box(&envelope)).unwrap();
            black_box(bytes)
        });
    });

    c.bench_function("export_downgrade_v1", |b| {
        let mut config = EngineConfig::default();
        config.export.target_version = 1;
        let downgrading = ConfigPorter::new(&registry, config);

        b.iter(|| {
            let bytes = downgrading.export_config(black_box(&envelope)).unwrap();
            black_box(bytes)
        });
    });

    c.bench_function("validate_full_data", |b| {
        let validator = Validator::new(&registry);
        let mut data = envelope.data().clone();
        data.warns.action = PunishAction::Tban;
        data.warns.action_duration = 0;
        let value = serde_json::to_value(&data).unwrap();
        let map = value.as_object().unwrap().clone();

        b.iter(|| {
            let validation = validator.validate_data(black_box(&map));
            black_box(validation)
        });
    });

    c.bench_function("fingerprint", |b| {
        b.iter(|| {
            let digest = porter.fingerprint(black_box(&envelope)).unwrap();
            black_box(digest)
        });
    });
}

criterion_group!(benches, config_processing_benchmark);
criterion_main!(benches);

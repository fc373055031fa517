//! 版本 1 -> 2 的迁移
//!
//! 版本 2 相对版本 1 的变化：
//! - 新增 `federations` 模块
//! - `clean_service.service_types.voicechat` 更名为 `videochat`
//! - `locks.allowlisted_url` 由链接字符串列表拆分为 `{group_id, group_username, url}` 对象列表
//! - `warns.warn_time` 更名为 `warns.warn_for`
//! - 移除 `connections` 模块，其数据保留在信封的 `retired` 中
//!
//! 重命名时新旧字段同时存在且取值不同，以新字段为准，旧值以
//! `模块.路径.旧字段` 为键保留在 `retired` 中，不中断迁移。

use crate::migration::step::{object_at, rename_key, MigrationStep};
use crate::model::{ModuleName, RawEnvelope};
use crate::schema::SchemaRegistry;
use serde_json::{json, Value};

/// 版本 2 中移除的模块
const RETIRED_CONNECTIONS: &str = "connections";

/// 重命名字段，冲突时把旧值放入 `retired`
fn rename_or_retire(envelope: &mut RawEnvelope, path: &[&str], from: &str, to: &str) {
    let Some(object) = object_at(&mut envelope.data, path) else {
        return;
    };
    if let Some(displaced) = rename_key(object, from, to) {
        let key = format!("{}.{}", path.join("."), from);
        tracing::warn!(field = key.as_str(), kept = to, "字段冲突，旧值已移入 retired");
        envelope.retired.insert(key, displaced);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct V1ToV2;

impl MigrationStep for V1ToV2 {
    fn from_version(&self) -> u32 {
        1
    }

    fn upgrade(
        &self,
        envelope: &mut RawEnvelope,
        registry: &SchemaRegistry,
    ) -> Result<(), String> {
        if let Some(connections) = envelope.data.remove(RETIRED_CONNECTIONS) {
            envelope
                .retired
                .insert(RETIRED_CONNECTIONS.to_string(), connections);
        }

        let federations = ModuleName::Federations.as_str();
        if !envelope.data.contains_key(federations) {
            // 之前降级时保留下来的设置优先于默认值
            let settings = envelope
                .retired
                .remove(federations)
                .unwrap_or_else(|| Value::Object(registry.defaults(ModuleName::Federations)));
            envelope.data.insert(federations.to_string(), settings);
        }

        rename_or_retire(
            envelope,
            &["clean_service", "service_types"],
            "voicechat",
            "videochat",
        );
        rename_or_retire(envelope, &["warns"], "warn_time", "warn_for");

        if let Some(locks) = object_at(&mut envelope.data, &["locks"]) {
            if let Some(Value::Array(urls)) = locks.get_mut("allowlisted_url") {
                for entry in urls.iter_mut() {
                    if let Value::String(url) = entry {
                        *entry = json!({"group_id": 0, "group_username": "", "url": url.clone()});
                    }
                }
            }
        }

        Ok(())
    }

    fn downgrade(
        &self,
        envelope: &mut RawEnvelope,
        _registry: &SchemaRegistry,
    ) -> Result<(), String> {
        let federations = ModuleName::Federations.as_str();
        if let Some(settings) = envelope.data.remove(federations) {
            envelope.retired.insert(federations.to_string(), settings);
        }

        if let Some(connections) = envelope.retired.remove(RETIRED_CONNECTIONS) {
            envelope
                .data
                .insert(RETIRED_CONNECTIONS.to_string(), connections);
        }

        rename_or_retire(
            envelope,
            &["clean_service", "service_types"],
            "videochat",
            "voicechat",
        );
        rename_or_retire(envelope, &["warns"], "warn_for", "warn_time");

        if let Some(locks) = object_at(&mut envelope.data, &["locks"]) {
            if let Some(Value::Array(urls)) = locks.get_mut("allowlisted_url") {
                // 丢失 group_id 与 group_username
                for entry in urls.iter_mut() {
                    let url = entry.get("url").and_then(Value::as_str).map(str::to_string);
                    if let Some(url) = url {
                        *entry = Value::String(url);
                    }
                }
            }
        }

        Ok(())
    }
}

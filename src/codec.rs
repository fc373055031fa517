//! 编解码模块
//!
//! 在线上JSON与内存中的信封之间转换。解码只检查顶层形状
//! （恰好 `bot_id`、`data`、`version` 三个字段），模块内容交给校验器；
//! 编码是确定性的：键顺序稳定，时长为整数秒，枚举为规范名称。

use crate::error::CodecError;
use crate::model::{BotData, Envelope, RawEnvelope};
use serde::Serialize;
use serde_json::{Map, Value};

/// 顶层字段
const TOP_LEVEL_FIELDS: [&str; 3] = ["bot_id", "data", "version"];

/// 线上格式的信封视图，字段按字母序声明
#[derive(Serialize)]
struct WireEnvelope<'a, D: Serialize> {
    bot_id: u64,
    data: &'a D,
    version: u32,
}

/// 解码字节为原始信封
///
/// # 参数
/// * `bytes` - 线上JSON
/// * `max_bytes` - 输入大小上限，0 表示不限制
///
/// # 返回
/// * `Result<RawEnvelope, CodecError>` - 原始信封或编解码错误
pub fn decode(bytes: &[u8], max_bytes: usize) -> Result<RawEnvelope, CodecError> {
    if max_bytes > 0 && bytes.len() > max_bytes {
        return Err(CodecError::TooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }

    let value: Value = serde_json::from_slice(bytes).map_err(CodecError::Malformed)?;
    let Value::Object(mut top) = value else {
        return Err(CodecError::NotAnObject);
    };

    for field in TOP_LEVEL_FIELDS {
        if !top.contains_key(field) {
            return Err(CodecError::MissingField(field));
        }
    }
    if let Some(extra) = top.keys().find(|key| !TOP_LEVEL_FIELDS.contains(&key.as_str())) {
        return Err(CodecError::UnexpectedField(extra.clone()));
    }

    let bot_id = positive_integer(&top["bot_id"], "bot_id")?;
    let version = positive_integer(&top["version"], "version")?;
    let version = u32::try_from(version).map_err(|_| CodecError::InvalidField {
        field: "version",
        reason: format!("超出范围: {}", version),
    })?;

    let data = match top.remove("data") {
        Some(Value::Object(data)) => data,
        _ => {
            return Err(CodecError::InvalidField {
                field: "data",
                reason: "必须是对象".to_string(),
            })
        }
    };

    Ok(RawEnvelope::new(bot_id, version, data))
}

fn positive_integer(value: &Value, field: &'static str) -> Result<u64, CodecError> {
    match value.as_u64() {
        Some(n) if n > 0 => Ok(n),
        _ => Err(CodecError::InvalidField {
            field,
            reason: format!("必须是正整数，实际为 {}", value),
        }),
    }
}

fn write<T: Serialize>(value: &T, pretty: bool) -> Result<Vec<u8>, serde_json::Error> {
    if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    }
}

/// 编码规范化后的信封
pub fn encode(envelope: &Envelope, pretty: bool) -> Result<Vec<u8>, serde_json::Error> {
    let wire: WireEnvelope<'_, BotData> = WireEnvelope {
        bot_id: envelope.bot_id(),
        data: envelope.data(),
        version: envelope.version(),
    };
    write(&wire, pretty)
}

/// 编码原始信封（用于导出为旧版本），`retired` 不写入
pub fn encode_raw(envelope: &RawEnvelope, pretty: bool) -> Result<Vec<u8>, serde_json::Error> {
    let wire: WireEnvelope<'_, Map<String, Value>> = WireEnvelope {
        bot_id: envelope.bot_id,
        data: &envelope.data,
        version: envelope.version,
    };
    write(&wire, pretty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_minimal() {
        let raw = decode(br#"{"bot_id": 42, "version": 2, "data": {}}"#, 0).unwrap();
        assert_eq!(raw.bot_id, 42);
        assert_eq!(raw.version, 2);
        assert!(raw.data.is_empty());
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        assert!(matches!(
            decode(b"{\"bot_id\": 42,", 0),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        assert!(matches!(decode(b"[1, 2]", 0), Err(CodecError::NotAnObject)));
    }

    #[test]
    fn test_decode_enforces_exact_top_level() {
        assert!(matches!(
            decode(br#"{"bot_id": 1, "version": 2}"#, 0),
            Err(CodecError::MissingField("data"))
        ));
        match decode(br#"{"bot_id": 1, "version": 2, "data": {}, "extra": 0}"#, 0) {
            Err(CodecError::UnexpectedField(field)) => assert_eq!(field, "extra"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_non_positive_ids() {
        assert!(matches!(
            decode(br#"{"bot_id": 0, "version": 2, "data": {}}"#, 0),
            Err(CodecError::InvalidField { field: "bot_id", .. })
        ));
        assert!(matches!(
            decode(br#"{"bot_id": 1, "version": -2, "data": {}}"#, 0),
            Err(CodecError::InvalidField { field: "version", .. })
        ));
        assert!(matches!(
            decode(br#"{"bot_id": 1, "version": 2, "data": []}"#, 0),
            Err(CodecError::InvalidField { field: "data", .. })
        ));
    }

    #[test]
    fn test_decode_size_limit() {
        let bytes = br#"{"bot_id": 42, "version": 2, "data": {}}"#;
        assert!(matches!(
            decode(bytes, 10),
            Err(CodecError::TooLarge { limit: 10, .. })
        ));
        assert!(decode(bytes, bytes.len()).is_ok());
    }

    #[test]
    fn test_encode_is_deterministic_and_ordered() {
        let envelope = Envelope::new(42, BotData::default());
        let first = encode(&envelope, false).unwrap();
        let second = encode(&envelope.clone(), false).unwrap();
        assert_eq!(first, second);

        let text = String::from_utf8(first).unwrap();
        assert!(text.starts_with("{\"bot_id\":42,\"data\":{\"admin\":"));
        assert!(text.ends_with(",\"version\":2}"));
    }

    #[test]
    fn test_encode_raw_skips_retired() {
        let mut raw = RawEnvelope::new(5, 1, Map::new());
        raw.retired.insert("federations".to_string(), Value::Null);
        let text = String::from_utf8(encode_raw(&raw, false).unwrap()).unwrap();
        assert_eq!(text, r#"{"bot_id":5,"data":{},"version":1}"#);
    }
}

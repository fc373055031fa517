//! 时长编解码模块
//!
//! 在人类可读的时长简写（如 "4m"、"3h"、"6d"、"5w"）与规范的整数秒之间转换。
//! 线上格式始终使用整数秒，简写只在导入用户编写的字段时接受。

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// 时长单位及其秒数，按从大到小排列
const UNITS: [(char, u64); 5] = [('w', 604_800), ('d', 86_400), ('h', 3_600), ('m', 60), ('s', 1)];

/// 时长解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// 空字符串
    #[error("时长不能为空")]
    Empty,

    /// 没有单位的纯数字，无法判断含义
    #[error("时长缺少单位: {0}")]
    MissingUnit(String),

    /// 单位重复或顺序错误
    #[error("时长单位重复或顺序错误: {0}")]
    Ambiguous(String),

    /// 无法识别的格式
    #[error("无法解析的时长: {0}")]
    Invalid(String),

    /// 数值溢出
    #[error("时长数值溢出: {0}")]
    Overflow(String),
}

fn group_regex() -> &'static Regex {
    static GROUP: OnceLock<Regex> = OnceLock::new();
    GROUP.get_or_init(|| Regex::new(r"(\d+)([wdhms])").expect("静态时长正则"))
}

fn unit_index(unit: char) -> usize {
    UNITS
        .iter()
        .position(|(u, _)| *u == unit)
        .unwrap_or(UNITS.len())
}

/// 解析时长简写为秒数
///
/// 支持一个或多个 `<数字><单位>` 组合，单位为 `w d h m s`，
/// 必须从大到小排列且每个单位最多出现一次，例如 `"1w2d"`、`"90s"`。
///
/// # 参数
/// * `input` - 时长简写
///
/// # 返回
/// * `Result<u64, DurationError>` - 秒数或解析错误
pub fn parse_duration(input: &str) -> Result<u64, DurationError> {
    if input.is_empty() {
        return Err(DurationError::Empty);
    }
    if input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DurationError::MissingUnit(input.to_string()));
    }

    let mut total: u64 = 0;
    let mut cursor = 0;
    let mut last_unit: Option<usize> = None;

    for captures in group_regex().captures_iter(input) {
        let whole = captures.get(0).ok_or_else(|| DurationError::Invalid(input.to_string()))?;
        // 各组必须首尾相接地覆盖整个输入
        if whole.start() != cursor {
            return Err(DurationError::Invalid(input.to_string()));
        }
        cursor = whole.end();

        let unit = captures[2].chars().next().unwrap_or('?');
        let index = unit_index(unit);
        if let Some(previous) = last_unit {
            if index <= previous {
                return Err(DurationError::Ambiguous(input.to_string()));
            }
        }
        last_unit = Some(index);

        let amount: u64 = captures[1]
            .parse()
            .map_err(|_| DurationError::Overflow(input.to_string()))?;
        let seconds = amount
            .checked_mul(UNITS[index].1)
            .and_then(|s| total.checked_add(s))
            .ok_or_else(|| DurationError::Overflow(input.to_string()))?;
        total = seconds;
    }

    if cursor != input.len() || last_unit.is_none() {
        return Err(DurationError::Invalid(input.to_string()));
    }

    Ok(total)
}

/// 将秒数格式化为规范的时长简写
///
/// 按从大到小的单位拆分，省略为零的单位；`0` 格式化为 `"0s"`。
pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }

    let mut remaining = seconds;
    let mut out = String::new();
    for (unit, size) in UNITS {
        let amount = remaining / size;
        if amount > 0 {
            out.push_str(&amount.to_string());
            out.push(unit);
            remaining %= size;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_units() {
        assert_eq!(parse_duration("4m").unwrap(), 240);
        assert_eq!(parse_duration("3h").unwrap(), 10_800);
        assert_eq!(parse_duration("6d").unwrap(), 518_400);
        assert_eq!(parse_duration("5w").unwrap(), 3_024_000);
        assert_eq!(parse_duration("45s").unwrap(), 45);
    }

    #[test]
    fn test_parse_compound() {
        assert_eq!(parse_duration("1w2d").unwrap(), 604_800 + 2 * 86_400);
        assert_eq!(parse_duration("1h30m").unwrap(), 5_400);
        assert_eq!(parse_duration("1d1h1m1s").unwrap(), 90_061);
    }

    #[test]
    fn test_parse_rejects_bare_number() {
        assert_eq!(
            parse_duration("240"),
            Err(DurationError::MissingUnit("240".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_out_of_order_units() {
        assert!(matches!(parse_duration("30m1h"), Err(DurationError::Ambiguous(_))));
        assert!(matches!(parse_duration("1h1h"), Err(DurationError::Ambiguous(_))));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_duration(""), Err(DurationError::Empty));
        assert!(matches!(parse_duration("4 m"), Err(DurationError::Invalid(_))));
        assert!(matches!(parse_duration("4y"), Err(DurationError::Invalid(_))));
        assert!(matches!(parse_duration("m"), Err(DurationError::Invalid(_))));
        assert!(matches!(parse_duration("-4m"), Err(DurationError::Invalid(_))));
        assert!(matches!(parse_duration("4mx"), Err(DurationError::Invalid(_))));
    }

    #[test]
    fn test_parse_overflow() {
        assert!(matches!(
            parse_duration("99999999999999999999w"),
            Err(DurationError::Overflow(_))
        ));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(240), "4m");
        assert_eq!(format_duration(90_061), "1d1h1m1s");
        assert_eq!(format_duration(1_209_600), "2w");
    }

    #[test]
    fn test_format_then_parse_is_stable() {
        for secs in [1, 59, 61, 3_600, 86_399, 777_777] {
            assert_eq!(parse_duration(&format_duration(secs)).unwrap(), secs);
        }
    }
}

//! 内置模块定义表
//!
//! 当前模式版本下17个模块的全部字段。默认值与 `model::settings` 中的
//! `Default` 实现保持一致。

use crate::model::settings::{
    BlocklistAction, ContentType, PunishAction, DEFAULT_GOODBYE_TEXT, DEFAULT_WELCOME_TEXT,
    TIMED_ACTIONS,
};
use crate::model::{LockKind, ModuleName};
use crate::schema::field::{FieldSpec, Invariant};
use crate::schema::registry::ModuleSpec;
use std::sync::OnceLock;

/// 命令清理类别
pub const COMMAND_TYPES: &[&str] = &["admin", "all", "other", "user"];

/// 服务消息清理类别
pub const SERVICE_TYPES: &[&str] = &[
    "all", "join", "leave", "other", "photo", "pin", "title", "videochat",
];

/// 锁类别的线上名称
pub fn lock_names() -> &'static [&'static str] {
    static NAMES: OnceLock<Vec<&'static str>> = OnceLock::new();
    NAMES
        .get_or_init(|| LockKind::ALL.iter().map(|kind| kind.as_str()).collect())
        .as_slice()
}

/// 动作 + 时长组合
fn action_spec(actions: &'static [&'static str], default: &'static str) -> [FieldSpec; 2] {
    [
        FieldSpec::enumeration("action", actions, default),
        FieldSpec::duration("action_duration", 0).with_invariant(
            Invariant::PositiveWhenTimed {
                action_field: "action",
                timed: TIMED_ACTIONS,
            },
        ),
    ]
}

/// 内容条目字段；`named` 为真时包含必填的 `name`
fn content_fields(named: bool, text_default: &str) -> Vec<FieldSpec> {
    let mut fields = vec![FieldSpec::string("data_id", "")];
    if named {
        fields.push(FieldSpec::string("name", "").required());
    }
    fields.push(FieldSpec::string("text", text_default));
    fields.push(FieldSpec::code("type", ContentType::CODES, 0));
    fields
}

fn clean_toggle() -> Vec<FieldSpec> {
    vec![FieldSpec::bool("clean", false)]
}

/// 构建全部内置模块定义
pub fn builtin_modules() -> Vec<ModuleSpec> {
    let [flood_action, flood_duration] = action_spec(PunishAction::NAMES, "mute");
    let [block_action, block_duration] = action_spec(BlocklistAction::NAMES, "nothing");
    let [warn_action, warn_duration] = action_spec(PunishAction::NAMES, "mute");

    vec![
        ModuleSpec::new(
            ModuleName::Admin,
            "Make it easy to promote and demote users",
            vec![
                FieldSpec::bool("admin_error_disable", false),
                FieldSpec::bool("anon_admin", false),
                FieldSpec::bool("legacy_admin", false),
            ],
        ),
        ModuleSpec::new(
            ModuleName::Antiflood,
            "Take action on users that send more than x messages in a row",
            vec![
                flood_action,
                flood_duration,
                FieldSpec::bool("flood_clear", false),
                FieldSpec::integer("flood_limit", 0),
                FieldSpec::duration("flood_timer", 0),
                FieldSpec::integer("flood_timer_limit", 0),
            ],
        ),
        ModuleSpec::new(
            ModuleName::Blocklists,
            "Block words, filenames or emoji and act on whoever sends them",
            vec![
                block_action,
                block_duration,
                FieldSpec::string("default_reason", ""),
                FieldSpec::list(
                    "filters",
                    vec![
                        FieldSpec::string("name", "").required(),
                        FieldSpec::string("reason", ""),
                    ],
                ),
                FieldSpec::bool("should_delete", true),
            ],
        ),
        ModuleSpec::new(
            ModuleName::CleanCommand,
            "Delete command messages from users and admins",
            vec![FieldSpec::keyed("command_types", COMMAND_TYPES, clean_toggle())],
        ),
        ModuleSpec::new(
            ModuleName::CleanService,
            "Delete automated service messages",
            vec![FieldSpec::keyed("service_types", SERVICE_TYPES, clean_toggle())],
        ),
        ModuleSpec::new(
            ModuleName::Disabled,
            "Disable commonly used commands so no one can use them",
            vec![
                FieldSpec::bool("disable_admin", false),
                FieldSpec::list("disabled", vec![FieldSpec::string("name", "").required()]),
                FieldSpec::bool("should_delete", false),
            ],
        ),
        ModuleSpec::new(
            ModuleName::Federations,
            "Share bans across every chat in a federation",
            vec![
                FieldSpec::string("fed_id", ""),
                FieldSpec::bool("quiet_ban", false),
            ],
        ),
        ModuleSpec::new(
            ModuleName::Filters,
            "Reply automatically when trigger words are said",
            vec![FieldSpec::list("filters", content_fields(true, ""))],
        ),
        ModuleSpec::new(
            ModuleName::Greetings,
            "Welcome new members and say goodbye to leaving ones",
            vec![
                FieldSpec::bool("captcha_rules", false),
                FieldSpec::object("goodbye", content_fields(false, DEFAULT_GOODBYE_TEXT)),
                FieldSpec::duration("kick_after", 0),
                FieldSpec::duration("mute_for", 0),
                FieldSpec::string("mute_mode", "button"),
                FieldSpec::string("mute_text", ""),
                FieldSpec::bool("should_clean", false),
                FieldSpec::bool("should_goodbye", false),
                FieldSpec::bool("should_kick", false),
                FieldSpec::bool("should_mute", false),
                FieldSpec::bool("should_welcome", true),
                FieldSpec::object("welcome", content_fields(false, DEFAULT_WELCOME_TEXT)),
            ],
        ),
        ModuleSpec::new(
            ModuleName::Locks,
            "Lock away content categories so they are deleted automatically",
            vec![
                FieldSpec::list(
                    "allowlisted_url",
                    vec![
                        FieldSpec::signed("group_id", 0),
                        FieldSpec::string("group_username", ""),
                        FieldSpec::string("url", "").required(),
                    ],
                ),
                FieldSpec::bool("lock_warns", false),
                FieldSpec::keyed(
                    "locks",
                    lock_names(),
                    vec![FieldSpec::bool("locked", false), FieldSpec::string("reason", "")],
                ),
            ],
        ),
        ModuleSpec::new(
            ModuleName::Notes,
            "Save notes that members can fetch later",
            vec![
                FieldSpec::list("notes", content_fields(true, "")),
                FieldSpec::bool("private_notes", false),
            ],
        ),
        ModuleSpec::new(
            ModuleName::Pins,
            "Control pinning of linked channel posts",
            vec![
                FieldSpec::bool("antichannelpin", false),
                FieldSpec::bool("cleanlinked", false),
            ],
        ),
        ModuleSpec::new(
            ModuleName::Raids,
            "Temporarily act on every new member during a raid",
            vec![
                FieldSpec::duration("raid_mode_action_duration", 3_600),
                FieldSpec::integer("raid_mode_auto_limit", 0),
                FieldSpec::duration("raid_mode_duration", 21_600),
            ],
        ),
        ModuleSpec::new(
            ModuleName::Reports,
            "Let members call all admins with a report",
            vec![FieldSpec::bool("disable_reports", false)],
        ),
        ModuleSpec::new(
            ModuleName::Rules,
            "Chat rules and how they are delivered",
            vec![
                FieldSpec::string("button_name", "Rules"),
                FieldSpec::string("content", ""),
                FieldSpec::bool("send_to_chat", false),
            ],
        ),
        ModuleSpec::new(
            ModuleName::Translations,
            "Language of the bot's replies",
            vec![FieldSpec::string("lang", "en")],
        ),
        ModuleSpec::new(
            ModuleName::Warns,
            "Warn members and punish them once the limit is reached",
            vec![
                warn_action,
                warn_duration,
                FieldSpec::duration("warn_for", 0),
                FieldSpec::integer("warn_limit", 3),
            ],
        ),
    ]
}

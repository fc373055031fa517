//! 模块设置数据结构
//!
//! 每个模块一个记录类型，字段集合固定。字段按字母序声明，
//! 以保证序列化结果的键顺序稳定。

use crate::model::names::LockKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 惩罚动作（反刷屏、警告模块）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PunishAction {
    Ban,
    #[default]
    Mute,
    Kick,
    Tban,
    Tmute,
}

impl PunishAction {
    /// 全部取值的线上名称
    pub const NAMES: &'static [&'static str] = &["ban", "mute", "kick", "tban", "tmute"];

    /// 是否为限时动作
    pub fn is_timed(&self) -> bool {
        matches!(self, PunishAction::Tban | PunishAction::Tmute)
    }
}

/// 屏蔽词命中后的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlocklistAction {
    #[default]
    Nothing,
    Ban,
    Mute,
    Kick,
    Warn,
    Tban,
    Tmute,
}

impl BlocklistAction {
    /// 全部取值的线上名称
    pub const NAMES: &'static [&'static str] =
        &["nothing", "ban", "mute", "kick", "warn", "tban", "tmute"];

    /// 是否为限时动作
    pub fn is_timed(&self) -> bool {
        matches!(self, BlocklistAction::Tban | BlocklistAction::Tmute)
    }
}

/// 限时动作的线上名称
pub const TIMED_ACTIONS: &[&str] = &["tban", "tmute"];

/// 内容类型，线上以整数编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ContentType {
    #[default]
    Text,
    Button,
    Sticker,
    Document,
    Photo,
    Audio,
    Voice,
    Video,
    VideoNote,
    Animation,
}

impl ContentType {
    /// 全部合法的整数编码
    pub const CODES: &'static [i64] = &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9];

    /// 是否依赖外部媒体存储（`data_id`）
    pub fn is_media(&self) -> bool {
        !matches!(self, ContentType::Text | ContentType::Button)
    }
}

/// 非法的内容类型编码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidContentType(pub u8);

impl fmt::Display for InvalidContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "未知的内容类型编码: {}", self.0)
    }
}

impl TryFrom<u8> for ContentType {
    type Error = InvalidContentType;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => ContentType::Text,
            1 => ContentType::Button,
            2 => ContentType::Sticker,
            3 => ContentType::Document,
            4 => ContentType::Photo,
            5 => ContentType::Audio,
            6 => ContentType::Voice,
            7 => ContentType::Video,
            8 => ContentType::VideoNote,
            9 => ContentType::Animation,
            other => return Err(InvalidContentType(other)),
        })
    }
}

impl From<ContentType> for u8 {
    fn from(kind: ContentType) -> Self {
        kind as u8
    }
}

/// 内容条目（过滤器、笔记、欢迎语共用）
///
/// `data_id` 是对外部媒体存储的弱引用，本引擎不拥有媒体本身。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentItem {
    pub data_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
}

/// 单个锁的状态
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LockEntry {
    pub locked: bool,
    pub reason: String,
}

/// 清理开关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CleanToggle {
    pub clean: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdminSettings {
    pub admin_error_disable: bool,
    pub anon_admin: bool,
    pub legacy_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AntifloodSettings {
    pub action: PunishAction,
    /// 秒
    pub action_duration: u64,
    pub flood_clear: bool,
    pub flood_limit: u64,
    /// 秒
    pub flood_timer: u64,
    pub flood_timer_limit: u64,
}

/// 屏蔽词条目
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlocklistFilter {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlocklistsSettings {
    pub action: BlocklistAction,
    pub action_duration: u64,
    pub default_reason: String,
    pub filters: Vec<BlocklistFilter>,
    pub should_delete: bool,
}

impl Default for BlocklistsSettings {
    fn default() -> Self {
        Self {
            action: BlocklistAction::Nothing,
            action_duration: 0,
            default_reason: String::new(),
            filters: Vec::new(),
            should_delete: true,
        }
    }
}

/// 命令清理类别
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandTypes {
    pub admin: CleanToggle,
    pub all: CleanToggle,
    pub other: CleanToggle,
    pub user: CleanToggle,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CleanCommandSettings {
    pub command_types: CommandTypes,
}

/// 服务消息清理类别
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceTypes {
    pub all: CleanToggle,
    pub join: CleanToggle,
    pub leave: CleanToggle,
    pub other: CleanToggle,
    pub photo: CleanToggle,
    pub pin: CleanToggle,
    pub title: CleanToggle,
    pub videochat: CleanToggle,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CleanServiceSettings {
    pub service_types: ServiceTypes,
}

/// 被禁用的命令
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisabledCommand {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisabledSettings {
    pub disable_admin: bool,
    pub disabled: Vec<DisabledCommand>,
    pub should_delete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FederationsSettings {
    pub fed_id: String,
    pub quiet_ban: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FiltersSettings {
    pub filters: Vec<ContentItem>,
}

/// 默认欢迎语
pub const DEFAULT_WELCOME_TEXT: &str = "Hey there {first}, and welcome to {chatname}! How are you?";
/// 默认告别语
pub const DEFAULT_GOODBYE_TEXT: &str = "Nice knowing ya!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetingsSettings {
    pub captcha_rules: bool,
    pub goodbye: ContentItem,
    /// 秒
    pub kick_after: u64,
    /// 秒
    pub mute_for: u64,
    pub mute_mode: String,
    pub mute_text: String,
    pub should_clean: bool,
    pub should_goodbye: bool,
    pub should_kick: bool,
    pub should_mute: bool,
    pub should_welcome: bool,
    pub welcome: ContentItem,
}

impl Default for GreetingsSettings {
    fn default() -> Self {
        Self {
            captcha_rules: false,
            goodbye: ContentItem {
                text: DEFAULT_GOODBYE_TEXT.to_string(),
                ..ContentItem::default()
            },
            kick_after: 0,
            mute_for: 0,
            mute_mode: "button".to_string(),
            mute_text: String::new(),
            should_clean: false,
            should_goodbye: false,
            should_kick: false,
            should_mute: false,
            should_welcome: true,
            welcome: ContentItem {
                text: DEFAULT_WELCOME_TEXT.to_string(),
                ..ContentItem::default()
            },
        }
    }
}

/// 允许的链接
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllowlistedUrl {
    pub group_id: i64,
    pub group_username: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocksSettings {
    pub allowlisted_url: Vec<AllowlistedUrl>,
    pub lock_warns: bool,
    pub locks: BTreeMap<LockKind, LockEntry>,
}

impl Default for LocksSettings {
    fn default() -> Self {
        Self {
            allowlisted_url: Vec::new(),
            lock_warns: false,
            locks: LockKind::ALL
                .iter()
                .map(|kind| (*kind, LockEntry::default()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotesSettings {
    pub notes: Vec<ContentItem>,
    pub private_notes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PinsSettings {
    pub antichannelpin: bool,
    pub cleanlinked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidsSettings {
    /// 秒
    pub raid_mode_action_duration: u64,
    pub raid_mode_auto_limit: u64,
    /// 秒
    pub raid_mode_duration: u64,
}

impl Default for RaidsSettings {
    fn default() -> Self {
        Self {
            raid_mode_action_duration: 3_600,
            raid_mode_auto_limit: 0,
            raid_mode_duration: 21_600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportsSettings {
    pub disable_reports: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesSettings {
    pub button_name: String,
    pub content: String,
    pub send_to_chat: bool,
}

impl Default for RulesSettings {
    fn default() -> Self {
        Self {
            button_name: "Rules".to_string(),
            content: String::new(),
            send_to_chat: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationsSettings {
    pub lang: String,
}

impl Default for TranslationsSettings {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarnsSettings {
    pub action: PunishAction,
    pub action_duration: u64,
    /// 警告有效期（秒），0 表示永久
    pub warn_for: u64,
    pub warn_limit: u64,
}

impl Default for WarnsSettings {
    fn default() -> Self {
        Self {
            action: PunishAction::Mute,
            action_duration: 0,
            warn_for: 0,
            warn_limit: 3,
        }
    }
}

/// 全部模块的设置，键集合固定为17个模块
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotData {
    pub admin: AdminSettings,
    pub antiflood: AntifloodSettings,
    pub blocklists: BlocklistsSettings,
    pub clean_command: CleanCommandSettings,
    pub clean_service: CleanServiceSettings,
    pub disabled: DisabledSettings,
    pub federations: FederationsSettings,
    pub filters: FiltersSettings,
    pub greetings: GreetingsSettings,
    pub locks: LocksSettings,
    pub notes: NotesSettings,
    pub pins: PinsSettings,
    pub raids: RaidsSettings,
    pub reports: ReportsSettings,
    pub rules: RulesSettings,
    pub translations: TranslationsSettings,
    pub warns: WarnsSettings,
}

//! 封闭名称集合
//!
//! 模块名与锁类型都是固定的封闭集合，在边界处穷举校验。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 名称不在封闭集合内
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownName(pub String);

impl fmt::Display for UnknownName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "未知名称: {}", self.0)
    }
}

impl std::error::Error for UnknownName {}

/// 定义封闭名称枚举，同时生成 `ALL`、`as_str` 与 `FromStr`
macro_rules! closed_names {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// 集合中的全部名称，按字母序排列
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// 线上格式使用的名称
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownName(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_names! {
    /// 可独立配置的管理模块
    ModuleName {
        Admin => "admin",
        Antiflood => "antiflood",
        Blocklists => "blocklists",
        CleanCommand => "clean_command",
        CleanService => "clean_service",
        Disabled => "disabled",
        Federations => "federations",
        Filters => "filters",
        Greetings => "greetings",
        Locks => "locks",
        Notes => "notes",
        Pins => "pins",
        Raids => "raids",
        Reports => "reports",
        Rules => "rules",
        Translations => "translations",
        Warns => "warns",
    }
}

closed_names! {
    /// 可锁定的内容类别
    LockKind {
        Album => "album",
        All => "all",
        AnonChannel => "anonchannel",
        Audio => "audio",
        Bot => "bot",
        BotLink => "botlink",
        Button => "button",
        Cjk => "cjk",
        Command => "command",
        Comment => "comment",
        Contact => "contact",
        Cyrillic => "cyrillic",
        Document => "document",
        Email => "email",
        Emoji => "emoji",
        EmojiCustom => "emojicustom",
        EmojiGame => "emojigame",
        EmojiOnly => "emojionly",
        ExternalReply => "externalreply",
        Forward => "forward",
        ForwardBot => "forwardbot",
        ForwardChannel => "forwardchannel",
        ForwardStory => "forwardstory",
        ForwardUser => "forwarduser",
        Game => "game",
        Gif => "gif",
        Inline => "inline",
        InviteLink => "invitelink",
        Location => "location",
        Phone => "phone",
        Photo => "photo",
        Poll => "poll",
        Rtl => "rtl",
        Spoiler => "spoiler",
        Sticker => "sticker",
        StickerAnimated => "stickeranimated",
        StickerPremium => "stickerpremium",
        Text => "text",
        Url => "url",
        Video => "video",
        VideoNote => "videonote",
        Voice => "voice",
    }
}

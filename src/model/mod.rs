//! 数据模型模块
//!
//! 定义导出信封与各模块设置的强类型表示

pub mod envelope;
pub mod names;
pub mod settings;

pub use envelope::{Envelope, RawEnvelope, CURRENT_VERSION, MIN_VERSION};
pub use names::{LockKind, ModuleName, UnknownName};
pub use settings::{BlocklistAction, BotData, ContentItem, ContentType, LockEntry, PunishAction};

//! Modbot Config - 群组管理机器人设置的导入导出引擎
//!
//! 为17个功能模块的机器人设置提供带版本的数据契约：
//! - 模式注册表：每个模块的字段、类型、默认值与不变量
//! - 校验器：收集全部问题并生成规范化设置
//! - 迁移器：在相邻模式版本之间升级和降级
//! - 编解码：确定性的线上JSON编码
//! - 导入导出：组合以上步骤的 `import_config` / `export_config`

pub mod codec;
pub mod config;
pub mod duration;
pub mod error;
pub mod logging;
pub mod migration;
pub mod model;
pub mod porter;
pub mod report;
pub mod schema;
pub mod validation;

// 重新导出主要类型
pub use config::{ConfigLoader, EngineConfig, TomlConfigLoader};
pub use error::{ConfigPortError, Result};
pub use migration::{MigrationStep, Migrator};
pub use model::{BotData, Envelope, ModuleName, RawEnvelope, CURRENT_VERSION, MIN_VERSION};
pub use porter::{ConfigPorter, ImportOutcome};
pub use report::ViolationReport;
pub use schema::SchemaRegistry;
pub use validation::{Validator, Violation, ViolationKind};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

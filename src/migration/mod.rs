//! 版本迁移模块
//!
//! 由相邻版本之间的单步变换组成的有序迁移链

pub mod migrator;
pub mod step;
pub mod v1_to_v2;

pub use migrator::Migrator;
pub use step::MigrationStep;
pub use v1_to_v2::V1ToV2;

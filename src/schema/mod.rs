//! 模式注册表模块
//!
//! 提供字段定义、内置模块表以及进程级只读注册表

pub mod field;
pub mod modules;
pub mod registry;

pub use field::{FieldKind, FieldSpec, Invariant};
pub use registry::{global, install, ModuleSpec, SchemaRegistry, SchemaRegistryBuilder};

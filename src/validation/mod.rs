//! 校验模块
//!
//! 按模式注册表校验并规范化模块设置

pub mod validator;
pub mod violation;

pub use validator::Validator;
pub use violation::{Validation, Violation, ViolationKind};

//! 校验报告模块
//!
//! 将校验问题按模块分组，并用Handlebars模板渲染成完整报告，
//! 便于调用方一次性展示全部问题。

use crate::model::ModuleName;
use crate::schema::SchemaRegistry;
use crate::validation::Violation;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use handlebars::Handlebars;
use serde::Serialize;
use std::collections::BTreeMap;

/// 单个模块的问题分组
#[derive(Debug, Clone, Serialize)]
pub struct ModuleSection {
    /// 模块名
    pub module: String,
    /// 模块说明（未知模块为空）
    pub description: String,
    /// 该模块的问题
    pub violations: Vec<Violation>,
}

/// 校验报告
#[derive(Debug, Clone, Serialize)]
pub struct ViolationReport {
    /// 生成时间
    pub generated_at: DateTime<Utc>,
    /// 问题总数
    pub total: usize,
    /// 按模块名排序的分组
    pub modules: Vec<ModuleSection>,
}

impl ViolationReport {
    /// 创建报告
    ///
    /// # 参数
    /// * `violations` - 校验问题
    /// * `registry` - 用于查找模块说明
    pub fn new(violations: &[Violation], registry: &SchemaRegistry) -> Self {
        let mut grouped: BTreeMap<String, Vec<Violation>> = BTreeMap::new();
        for violation in violations {
            grouped
                .entry(violation.module().to_string())
                .or_default()
                .push(violation.clone());
        }

        let modules = grouped
            .into_iter()
            .map(|(module, violations)| ModuleSection {
                description: module
                    .parse::<ModuleName>()
                    .map(|name| registry.module(name).description.to_string())
                    .unwrap_or_default(),
                module,
                violations,
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            total: violations.len(),
            modules,
        }
    }

    /// 是否没有任何问题
    pub fn is_clean(&self) -> bool {
        self.total == 0
    }

    /// 使用默认模板渲染
    pub fn render(&self) -> Result<String> {
        self.render_with(&default_report_template())
    }

    /// 使用自定义模板渲染
    ///
    /// # 参数
    /// * `template` - Handlebars模板
    ///
    /// # 返回
    /// * `Result<String>` - 渲染后的报告
    pub fn render_with(&self, template: &str) -> Result<String> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_string("report", template)
            .context("报告模板语法错误")?;
        handlebars
            .render("report", self)
            .context("报告渲染失败")
    }
}

/// 默认的报告模板
pub fn default_report_template() -> String {
    r#"配置校验报告 ({{total}} 个问题)
{{#each modules}}
[{{module}}]{{#if description}} {{description}}{{/if}}
{{#each violations}}
  - {{path}} ({{kind}}): {{message}}
{{/each}}
{{/each}}"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ViolationKind;

    fn sample() -> Vec<Violation> {
        vec![
            Violation::new(
                "warns.action_duration",
                ViolationKind::InvariantViolated,
                "动作 tban 需要正数时长",
            ),
            Violation::new("locks.locks.teleport", ViolationKind::UnknownKey, "未知的键"),
            Violation::new("connections", ViolationKind::UnknownKey, "未知的模块"),
        ]
    }

    #[test]
    fn test_groups_by_module() {
        let registry = SchemaRegistry::builtin().unwrap();
        let report = ViolationReport::new(&sample(), &registry);
        assert_eq!(report.total, 3);
        let names: Vec<&str> = report.modules.iter().map(|m| m.module.as_str()).collect();
        assert_eq!(names, vec!["connections", "locks", "warns"]);
        assert!(report.modules[0].description.is_empty());
        assert!(!report.modules[2].description.is_empty());
    }

    #[test]
    fn test_default_render_lists_every_violation() {
        let registry = SchemaRegistry::builtin().unwrap();
        let rendered = ViolationReport::new(&sample(), &registry).render().unwrap();
        assert!(rendered.contains("3 个问题"));
        assert!(rendered.contains("warns.action_duration (invariant_violated)"));
        assert!(rendered.contains("locks.locks.teleport (unknown_key)"));
    }

    #[test]
    fn test_custom_template() {
        let registry = SchemaRegistry::builtin().unwrap();
        let report = ViolationReport::new(&[], &registry);
        assert!(report.is_clean());
        assert_eq!(report.render_with("{{total}} issues").unwrap(), "0 issues");
    }

    #[test]
    fn test_broken_template_is_an_error() {
        let registry = SchemaRegistry::builtin().unwrap();
        let report = ViolationReport::new(&sample(), &registry);
        assert!(report.render_with("{{#each modules}}").is_err());
    }
}

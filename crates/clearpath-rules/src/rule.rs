//! Rule book types.

use crate::error::{Result, RuleError};
use clearpath_core::EntityType;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flag severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Name cannot be used
    Block,
    /// Name likely needs approval or changes
    Warning,
    /// Informational only
    Info,
}

impl Severity {
    /// Uppercase label used in flags.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Block => "BLOCK",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

/// One naming rule as written in a rule book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingRule {
    /// Case-insensitive regex matched anywhere in the name
    pub pattern: String,
    /// Message emitted when the pattern matches
    pub message: String,
    /// Severity of the emitted flag
    pub severity: Severity,
    /// Entity types the rule applies to; absent means all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_types: Option<Vec<EntityType>>,
}

impl NamingRule {
    /// Whether the rule applies to `entity_type`.
    #[must_use]
    pub fn applies_to(&self, entity_type: EntityType) -> bool {
        self.entity_types
            .as_ref()
            .map_or(true, |types| types.contains(&entity_type))
    }
}

/// Jurisdiction header of a rule book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionInfo {
    /// Jurisdiction code (e.g. `DE`)
    pub code: String,
    /// Plain-language summary of the naming rules
    #[serde(default)]
    pub summary: String,
}

/// A jurisdiction's ordered rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleBook {
    /// Jurisdiction header
    pub jurisdiction: JurisdictionInfo,
    /// Rules in declaration order
    #[serde(default)]
    pub rules: Vec<NamingRule>,
}

impl RuleBook {
    /// Parse a rule book from TOML text.
    pub fn from_toml(contents: &str, origin: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|source| RuleError::Parse {
            origin: origin.to_string(),
            source,
        })
    }
}

/// A rule with its pattern compiled.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub(crate) rule: NamingRule,
    pub(crate) regex: Regex,
}

impl CompiledRule {
    pub(crate) fn compile(rule: NamingRule, jurisdiction: &str) -> Result<Self> {
        let regex = RegexBuilder::new(&rule.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| RuleError::InvalidPattern {
                jurisdiction: jurisdiction.to_string(),
                pattern: rule.pattern.clone(),
                source,
            })?;
        Ok(Self { rule, regex })
    }
}

/// A rule hit, rendered as `[SEVERITY] message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingFlag {
    /// Severity of the matched rule
    pub severity: Severity,
    /// Rule message
    pub message: String,
}

impl fmt::Display for NamingFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.label(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_display() {
        let flag = NamingFlag {
            severity: Severity::Info,
            message: "Heads up.".to_string(),
        };
        assert_eq!(flag.to_string(), "[INFO] Heads up.");
    }

    #[test]
    fn test_rule_applies_to() {
        let rule = NamingRule {
            pattern: r"\binc\b".to_string(),
            message: "m".to_string(),
            severity: Severity::Warning,
            entity_types: Some(vec![EntityType::Llc]),
        };
        assert!(rule.applies_to(EntityType::Llc));
        assert!(!rule.applies_to(EntityType::Corporation));

        let universal = NamingRule {
            entity_types: None,
            ..rule
        };
        assert!(universal.applies_to(EntityType::Pllc));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let rule = NamingRule {
            pattern: "(unclosed".to_string(),
            message: "m".to_string(),
            severity: Severity::Block,
            entity_types: None,
        };
        assert!(matches!(
            CompiledRule::compile(rule, "XX"),
            Err(RuleError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_parse_rule_book() {
        let book = RuleBook::from_toml(
            r#"
[jurisdiction]
code = "ZZ"

[[rules]]
pattern = 'foo'
message = "No foo."
severity = "block"
entity_types = ["PLLC"]
"#,
            "inline",
        )
        .expect("parse rule book");
        assert_eq!(book.jurisdiction.code, "ZZ");
        assert_eq!(book.rules.len(), 1);
        assert_eq!(book.rules[0].severity, Severity::Block);
        assert_eq!(book.rules[0].entity_types, Some(vec![EntityType::Pllc]));
    }
}

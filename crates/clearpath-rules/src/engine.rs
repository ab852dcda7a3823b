//! Rule evaluation.

use crate::error::Result;
use crate::rule::{CompiledRule, NamingFlag, RuleBook};
use clearpath_core::EntityType;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Summary returned for jurisdictions without a rule book.
pub const NO_RULES_SUMMARY: &str = "No specific rules encoded for this state.";

const BUILTIN_BOOKS: &[(&str, &str)] = &[("de.toml", include_str!("../rules/de.toml"))];

#[derive(Debug, Clone)]
struct CompiledBook {
    summary: String,
    rules: Vec<CompiledRule>,
}

/// Per-jurisdiction naming rule evaluator.
///
/// Evaluation is pure: no I/O, same inputs always give the same flags.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    books: HashMap<String, CompiledBook>,
}

impl RuleEngine {
    /// Engine with no rule books.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Engine loaded with the embedded rule books.
    pub fn builtin() -> Result<Self> {
        let mut engine = Self::empty();
        for (origin, contents) in BUILTIN_BOOKS {
            engine.insert(RuleBook::from_toml(contents, origin)?)?;
        }
        Ok(engine)
    }

    /// Add or replace the book for its jurisdiction.
    pub fn insert(&mut self, book: RuleBook) -> Result<()> {
        let code = book.jurisdiction.code.to_uppercase();
        let rules = book
            .rules
            .into_iter()
            .map(|rule| CompiledRule::compile(rule, &code))
            .collect::<Result<Vec<_>>>()?;
        debug!(jurisdiction = %code, rules = rules.len(), "registered rule book");
        self.books.insert(
            code,
            CompiledBook {
                summary: book.jurisdiction.summary,
                rules,
            },
        );
        Ok(())
    }

    /// Load every `*.toml` rule book in `dir`, replacing books for the same jurisdiction.
    ///
    /// Unparseable files are logged and skipped.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let mut loaded = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                continue;
            }
            let contents = std::fs::read_to_string(&path)?;
            let origin = path.display().to_string();
            match RuleBook::from_toml(&contents, &origin).and_then(|book| self.insert(book)) {
                Ok(()) => loaded += 1,
                Err(e) => warn!(path = %origin, error = %e, "skipping invalid rule book"),
            }
        }
        info!(count = loaded, dir = %dir.display(), "loaded rule books");
        Ok(loaded)
    }

    /// Whether a book exists for `jurisdiction`.
    #[must_use]
    pub fn has_rules(&self, jurisdiction: &str) -> bool {
        self.books.contains_key(&jurisdiction.to_uppercase())
    }

    /// Matching rules for `name`, in declaration order.
    #[must_use]
    pub fn evaluate(&self, name: &str, entity_type: EntityType, jurisdiction: &str) -> Vec<NamingFlag> {
        let Some(book) = self.books.get(&jurisdiction.to_uppercase()) else {
            return Vec::new();
        };

        book.rules
            .iter()
            .filter(|compiled| compiled.rule.applies_to(entity_type))
            .filter(|compiled| compiled.regex.is_match(name))
            .map(|compiled| NamingFlag {
                severity: compiled.rule.severity,
                message: compiled.rule.message.clone(),
            })
            .collect()
    }

    /// Matching rules for `name` formatted as `[SEVERITY] message` strings.
    #[must_use]
    pub fn apply_rules(&self, name: &str, entity_type: EntityType, jurisdiction: &str) -> Vec<String> {
        self.evaluate(name, entity_type, jurisdiction)
            .into_iter()
            .map(|flag| flag.to_string())
            .collect()
    }

    /// Plain-language summary of a jurisdiction's rules.
    #[must_use]
    pub fn rules_summary(&self, jurisdiction: &str) -> &str {
        self.books
            .get(&jurisdiction.to_uppercase())
            .map(|book| book.summary.as_str())
            .filter(|summary| !summary.is_empty())
            .unwrap_or(NO_RULES_SUMMARY)
    }
}

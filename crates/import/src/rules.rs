use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_RULES: &str = include_str!("../rules/default_categories.toml");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: String,
    /// Tried in order; the first one contained in the vendor text wins.
    pub keywords: Vec<String>,
    /// Higher priorities are tried first.
    #[serde(default)]
    pub priority: i32,
}

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Failed to parse category rules: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Default category must not be empty")]
    EmptyDefault,
}

#[derive(Deserialize)]
struct RuleFile {
    default_category: String,
    #[serde(default)]
    rules: Vec<CategoryRule>,
}

/// Internal pairing of a rule with its lower-cased keywords.
#[derive(Debug, Clone)]
struct CompiledRule {
    rule: CategoryRule,
    needles: Vec<String>,
}

/// An immutable, priority-ordered keyword table mapping vendor text to an
/// account category.
///
/// Classification is a plain substring search: rules from highest to lowest
/// priority (equal priorities keep declaration order), keywords in
/// declared order, first hit wins. Anything unmatched gets the default.
#[derive(Debug, Clone)]
pub struct CategoryRuleSet {
    default_category: String,
    rules: Vec<CompiledRule>,
}

impl CategoryRuleSet {
    pub fn new(default_category: impl Into<String>, rules: Vec<CategoryRule>) -> Self {
        let mut compiled: Vec<CompiledRule> = rules
            .into_iter()
            .map(|rule| {
                let needles = rule.keywords.iter().map(|k| k.to_lowercase()).collect();
                CompiledRule { rule, needles }
            })
            .collect();
        // Stable: equal priorities stay in declaration order.
        compiled.sort_by(|a, b| b.rule.priority.cmp(&a.rule.priority));
        Self {
            default_category: default_category.into(),
            rules: compiled,
        }
    }

    pub fn from_toml(toml_content: &str) -> Result<Self, RuleError> {
        let file: RuleFile = toml::from_str(toml_content)?;
        if file.default_category.trim().is_empty() {
            return Err(RuleError::EmptyDefault);
        }
        Ok(Self::new(file.default_category, file.rules))
    }

    /// The shipped table, parsed once per process.
    pub fn builtin() -> &'static CategoryRuleSet {
        static BUILTIN: OnceLock<CategoryRuleSet> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            CategoryRuleSet::from_toml(DEFAULT_RULES).expect("built-in category rules are valid")
        })
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    pub fn classify(&self, vendor: &str) -> &str {
        if vendor.is_empty() {
            return &self.default_category;
        }
        let text = vendor.to_lowercase();

        let hit = self.rules.iter().find_map(|cr| {
            cr.needles
                .iter()
                .find(|needle| text.contains(needle.as_str()))
                .map(|needle| (cr, needle))
        });

        match hit {
            Some((cr, needle)) => {
                tracing::trace!(vendor, keyword = %needle, category = %cr.rule.category, "categorized");
                &cr.rule.category
            }
            None => &self.default_category,
        }
    }

    /// Returns a new set with `keyword` appended to `category`. The set is
    /// returned unchanged when the category is unknown or already lists the
    /// keyword.
    pub fn with_keyword(&self, category: &str, keyword: &str) -> CategoryRuleSet {
        let mut next = self.clone();
        if let Some(cr) = next.rules.iter_mut().find(|cr| cr.rule.category == category) {
            if !cr.rule.keywords.iter().any(|k| k == keyword) {
                cr.rule.keywords.push(keyword.to_string());
                cr.needles.push(keyword.to_lowercase());
            }
        }
        next
    }

    /// Keywords for `category`, empty if the category has no rule.
    pub fn keywords_for(&self, category: &str) -> &[String] {
        self.rules
            .iter()
            .find(|cr| cr.rule.category == category)
            .map(|cr| cr.rule.keywords.as_slice())
            .unwrap_or_default()
    }

    /// Category labels in the order they are tried.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|cr| cr.rule.category.as_str())
    }

    pub fn rules(&self) -> impl Iterator<Item = &CategoryRule> {
        self.rules.iter().map(|cr| &cr.rule)
    }
}

/// Classifies vendor text against the built-in table.
pub fn determine_account_category(vendor: &str) -> &'static str {
    CategoryRuleSet::builtin().classify(vendor)
}

// File: ./src/model/category.rs
//! Keyword-based activity classification.
//!
//! Rules are evaluated in order and the first rule with a keyword contained in
//! the (lower-cased) text wins. Text that matches nothing is `General`.

use crate::model::item::ActivityCategory;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: ActivityCategory,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new<I, S>(category: ActivityCategory, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            category,
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// `lowered` must already be lower-case.
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            rules: vec![
                CategoryRule::new(
                    ActivityCategory::Meal,
                    ["breakfast", "lunch", "dinner", "meal"],
                ),
                CategoryRule::new(
                    ActivityCategory::Accommodation,
                    ["hotel", "check-in", "accommodation", "resort"],
                ),
                CategoryRule::new(
                    ActivityCategory::Sightseeing,
                    ["visit", "explore", "tour", "see", "view"],
                ),
                CategoryRule::new(
                    ActivityCategory::Travel,
                    ["drive", "travel", "depart", "arrive"],
                ),
            ],
        }
    }
}

impl CategoryRules {
    /// Builds a rule set from an explicit list. Keywords are normalized on the
    /// way in, so callers may pass mixed case.
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| CategoryRule::new(r.category, r.keywords))
            .collect();
        Self { rules }
    }

    pub fn push(&mut self, rule: CategoryRule) {
        self.rules.push(CategoryRule::new(rule.category, rule.keywords));
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn classify(&self, text: &str) -> ActivityCategory {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.category)
            .unwrap_or(ActivityCategory::General)
    }
}

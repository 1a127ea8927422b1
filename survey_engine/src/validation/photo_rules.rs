//! Expected photo count rules
//!
//! A rule ties a section to a set of numeric project fields. The number of
//! photos expected on each visible photo question of that section is the
//! rounded sum of those fields, scaled by the rule's multiplier.

use crate::config::constants::compile_time::validation::MAX_EXPECTED_PHOTOS_PER_QUESTION;
use crate::config::runtime::{ConfigError, ConfigResult};
use crate::project::ProjectContext;
use serde::{Deserialize, Serialize};

fn default_multiplier() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRule {
    /// Section name, matched trimmed and case-insensitively
    pub section: String,
    /// Project fields whose values are summed
    pub fields: Vec<String>,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl PhotoRule {
    pub fn new<I, S>(section: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            section: section.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            multiplier: default_multiplier(),
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn matches_section(&self, section: &str) -> bool {
        section_key(&self.section) == section_key(section)
    }

    /// `round(max(0, Σ fields) × multiplier)`, capped
    pub fn expected_per_question(&self, project: &ProjectContext) -> u32 {
        let sum: f64 = self.fields.iter().map(|field| project.number(field)).sum();
        let scaled = (sum.max(0.0) * self.multiplier).round();
        if !scaled.is_finite() {
            return 0;
        }
        scaled.min(f64::from(MAX_EXPECTED_PHOTOS_PER_QUESTION)) as u32
    }

    fn check(&self) -> ConfigResult<()> {
        if self.section.trim().is_empty() {
            return Err(ConfigError::invalid("photo rule has a blank section name"));
        }
        if self.fields.is_empty() || self.fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ConfigError::invalid(format!(
                "photo rule for '{}' needs at least one non-blank project field",
                self.section.trim()
            )));
        }
        if !self.multiplier.is_finite() || self.multiplier < 0.0 {
            return Err(ConfigError::invalid(format!(
                "photo rule for '{}' has invalid multiplier {}",
                self.section.trim(),
                self.multiplier
            )));
        }
        Ok(())
    }
}

fn section_key(section: &str) -> String {
    section.trim().to_lowercase()
}

/// Validated rules, at most one per section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoRuleSet {
    rules: Vec<PhotoRule>,
}

impl PhotoRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: Vec<PhotoRule>) -> ConfigResult<Self> {
        let mut set = Self::new();
        for rule in rules {
            set.add(rule)?;
        }
        Ok(set)
    }

    pub fn add(&mut self, rule: PhotoRule) -> ConfigResult<()> {
        rule.check()?;
        if self.rule_for(&rule.section).is_some() {
            return Err(ConfigError::invalid(format!(
                "duplicate photo rule for section '{}'",
                rule.section.trim()
            )));
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn rule_for(&self, section: &str) -> Option<&PhotoRule> {
        self.rules.iter().find(|r| r.matches_section(section))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PhotoRule> {
        self.rules.iter()
    }
}

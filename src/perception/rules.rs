//! Detection rules: one (region, expected text) pair per recognizable screen.

use serde::{Deserialize, Serialize};

use super::region::Region;

/// Recognizes one screen: `text` must appear inside `region`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionRule {
    pub region: Region,
    pub text: String,
}

impl DetectionRule {
    pub fn new(region: Region, text: impl Into<String>) -> Self {
        Self {
            region,
            text: text.into(),
        }
    }

    /// True if any recognized token (trimmed) contains the expected text.
    pub fn matches<'a>(&self, tokens: impl IntoIterator<Item = &'a str>) -> bool {
        tokens
            .into_iter()
            .any(|token| token.trim().contains(self.text.as_str()))
    }
}

/// Detection rules keyed by screen name, kept in insertion order.
///
/// Order matters: the first matching rule wins, so screens whose text is a
/// subset of another's must come after the more specific one.
#[derive(Clone, Debug, Default)]
pub struct DetectionRules {
    entries: Vec<(String, DetectionRule)>,
}

impl DetectionRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule. Re-inserting a screen replaces its rule in place.
    pub fn insert(&mut self, screen: impl Into<String>, rule: DetectionRule) {
        let screen = screen.into();
        match self.entries.iter_mut().find(|(name, _)| *name == screen) {
            Some(entry) => entry.1 = rule,
            None => self.entries.push((screen, rule)),
        }
    }

    pub fn get(&self, screen: &str) -> Option<&DetectionRule> {
        self.entries
            .iter()
            .find(|(name, _)| name == screen)
            .map(|(_, rule)| rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DetectionRule)> {
        self.entries.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

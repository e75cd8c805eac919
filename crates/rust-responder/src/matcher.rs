//! Question matching.
//!
//! A [`QuestionMatcher`] keeps three tables of registered questions, one per
//! [`MatchRule`], and resolves an incoming line against them in a fixed order:
//! exact, then substring, then regex.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use indexmap::map::Entry;
use regex::Regex;
use serde::Deserialize;

use crate::error::{ResponderError, Result};
use crate::sequencer::AnswerSequencer;

/// How a registered question is compared against an incoming line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchRule {
    /// The whole line must equal the question.
    Exact,
    /// The line must contain the question.
    ///
    /// This is the default, since form output usually carries formatting
    /// around the question text.
    #[default]
    Substring,
    /// The question is a regular expression matched anywhere in the line.
    #[serde(alias = "regexp")]
    Regex,
}

impl FromStr for MatchRule {
    type Err = ResponderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "substring" | "contains" => Ok(Self::Substring),
            "regex" | "regexp" => Ok(Self::Regex),
            other => Err(ResponderError::config(format!(
                "unknown match rule '{other}'"
            ))),
        }
    }
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Substring => write!(f, "substring"),
            Self::Regex => write!(f, "regex"),
        }
    }
}

/// A question stored in the matcher together with its answers.
#[derive(Debug, Clone)]
pub struct RegisteredQuestion {
    key: String,
    rule: MatchRule,
    sequencer: AnswerSequencer,
}

impl RegisteredQuestion {
    /// The question text or pattern.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The rule this question is matched with.
    #[must_use]
    pub const fn rule(&self) -> MatchRule {
        self.rule
    }

    /// The answers for this question.
    #[must_use]
    pub const fn sequencer(&self) -> &AnswerSequencer {
        &self.sequencer
    }

    /// Mutable access to the answers, for dispensing.
    pub fn sequencer_mut(&mut self) -> &mut AnswerSequencer {
        &mut self.sequencer
    }
}

/// Registry of expected questions.
#[derive(Debug, Default)]
pub struct QuestionMatcher {
    exact: IndexMap<String, RegisteredQuestion>,
    substring: IndexMap<String, RegisteredQuestion>,
    regex: IndexMap<String, RegisteredQuestion>,
    regex_cache: HashMap<String, Regex>,
}

impl QuestionMatcher {
    /// Create an empty matcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a question, or extend an existing one.
    ///
    /// Registering the same key under the same rule again appends the new
    /// answers after the existing ones.
    ///
    /// # Errors
    ///
    /// Returns [`ResponderError::InvalidRegex`] if a regex question does not
    /// compile. The matcher is left unchanged in that case.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        rule: MatchRule,
        sequencer: AnswerSequencer,
    ) -> Result<()> {
        let key = key.into();

        if rule == MatchRule::Regex && !self.regex_cache.contains_key(&key) {
            let compiled = Regex::new(&key).map_err(|source| ResponderError::InvalidRegex {
                pattern: key.clone(),
                source,
            })?;
            self.regex_cache.insert(key.clone(), compiled);
        }

        match self.table_mut(rule).entry(key) {
            Entry::Occupied(mut entry) => entry.get_mut().sequencer.merge(sequencer),
            Entry::Vacant(entry) => {
                let key = entry.key().clone();
                entry.insert(RegisteredQuestion {
                    key,
                    rule,
                    sequencer,
                });
            }
        }

        Ok(())
    }

    /// Resolve a line to a registered question.
    ///
    /// Exact matches win over substring matches, which win over regex
    /// matches. Within the substring and regex tables the earliest
    /// registered question wins. `None` means the line is not a question.
    pub fn resolve(&mut self, line: &str) -> Option<&mut RegisteredQuestion> {
        if let Some(question) = self.exact.get_mut(line) {
            return Some(question);
        }

        if let Some(question) = self
            .substring
            .values_mut()
            .find(|q| line.contains(q.key.as_str()))
        {
            return Some(question);
        }

        let cache = &self.regex_cache;
        self.regex
            .values_mut()
            .find(|q| cache.get(&q.key).is_some_and(|re| re.is_match(line)))
    }

    /// Look up a registered question by key and rule.
    #[must_use]
    pub fn get(&self, key: &str, rule: MatchRule) -> Option<&RegisteredQuestion> {
        self.table(rule).get(key)
    }

    /// Total number of registered questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exact.len() + self.substring.len() + self.regex.len()
    }

    /// Check if no questions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over every registered question, exact ones first.
    pub fn questions(&self) -> impl Iterator<Item = &RegisteredQuestion> {
        self.exact
            .values()
            .chain(self.substring.values())
            .chain(self.regex.values())
    }

    /// Check if a regex pattern has been compiled.
    #[must_use]
    pub fn is_compiled(&self, pattern: &str) -> bool {
        self.regex_cache.contains_key(pattern)
    }

    const fn table(&self, rule: MatchRule) -> &IndexMap<String, RegisteredQuestion> {
        match rule {
            MatchRule::Exact => &self.exact,
            MatchRule::Substring => &self.substring,
            MatchRule::Regex => &self.regex,
        }
    }

    fn table_mut(&mut self, rule: MatchRule) -> &mut IndexMap<String, RegisteredQuestion> {
        match rule {
            MatchRule::Exact => &mut self.exact,
            MatchRule::Substring => &mut self.substring,
            MatchRule::Regex => &mut self.regex,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn answers(list: &[&'static str]) -> AnswerSequencer {
        let mut seq = AnswerSequencer::new();
        for a in list {
            seq.push(Bytes::from_static(a.as_bytes()));
        }
        seq
    }

    #[test]
    fn exact_requires_whole_line() {
        let mut matcher = QuestionMatcher::new();
        matcher
            .register("Name?", MatchRule::Exact, answers(&["Bob"]))
            .unwrap();

        assert!(matcher.resolve("Name?").is_some());
        assert!(matcher.resolve("  Name?  ").is_none());
    }

    #[test]
    fn exact_wins_over_substring() {
        let mut matcher = QuestionMatcher::new();
        matcher
            .register("Name", MatchRule::Substring, answers(&["sub"]))
            .unwrap();
        matcher
            .register("Name?", MatchRule::Exact, answers(&["exact"]))
            .unwrap();

        let q = matcher.resolve("Name?").unwrap();
        assert_eq!(q.rule(), MatchRule::Exact);
        assert_eq!(q.key(), "Name?");

        let q = matcher.resolve("Your Name?").unwrap();
        assert_eq!(q.rule(), MatchRule::Substring);
    }

    #[test]
    fn substring_wins_over_regex() {
        let mut matcher = QuestionMatcher::new();
        matcher
            .register(r"^Age\b", MatchRule::Regex, answers(&["re"]))
            .unwrap();
        matcher
            .register("Age", MatchRule::Substring, answers(&["sub"]))
            .unwrap();

        assert_eq!(matcher.resolve("Age?").unwrap().rule(), MatchRule::Substring);
    }

    #[test]
    fn regex_matches_anywhere() {
        let mut matcher = QuestionMatcher::new();
        matcher
            .register(r"\d+ apples", MatchRule::Regex, answers(&["yum"]))
            .unwrap();

        assert!(matcher.is_compiled(r"\d+ apples"));
        assert!(matcher.resolve("I have 12 apples today").is_some());
        assert!(matcher.resolve("I have no apples").is_none());
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let mut matcher = QuestionMatcher::new();
        let err = matcher
            .register("[oops", MatchRule::Regex, answers(&["x"]))
            .unwrap_err();
        assert!(matches!(err, ResponderError::InvalidRegex { .. }));
        assert!(matcher.is_empty());
    }

    #[test]
    fn reregistering_appends_answers() {
        for rule in [MatchRule::Exact, MatchRule::Substring, MatchRule::Regex] {
            let mut matcher = QuestionMatcher::new();
            matcher.register("q", rule, answers(&["a"])).unwrap();
            matcher.register("q", rule, answers(&["b", "c"])).unwrap();

            assert_eq!(matcher.len(), 1);
            let q = matcher.get("q", rule).unwrap();
            assert_eq!(q.sequencer().answers(), ["a", "b", "c"]);
        }
    }

    #[test]
    fn same_key_different_rules_are_separate() {
        let mut matcher = QuestionMatcher::new();
        matcher.register("q", MatchRule::Exact, answers(&["a"])).unwrap();
        matcher
            .register("q", MatchRule::Substring, answers(&["b"]))
            .unwrap();
        assert_eq!(matcher.len(), 2);
    }

    #[test]
    fn unknown_lines_resolve_to_none() {
        let mut matcher = QuestionMatcher::new();
        matcher
            .register("alright?", MatchRule::Substring, answers(&["yes"]))
            .unwrap();
        assert!(matcher.resolve("").is_none());
        assert!(matcher.resolve("Welcome to the form").is_none());
    }

    #[test]
    fn match_rule_from_str() {
        assert_eq!("exact".parse::<MatchRule>().unwrap(), MatchRule::Exact);
        assert_eq!("regexp".parse::<MatchRule>().unwrap(), MatchRule::Regex);
        assert!("fuzzy".parse::<MatchRule>().is_err());
        assert_eq!(MatchRule::default(), MatchRule::Substring);
    }
}

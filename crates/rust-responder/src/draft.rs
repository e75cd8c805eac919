//! Question drafts.
//!
//! A [`QuestionDraft`] accumulates everything about one question (its text,
//! match rule, answers and call limit) before it is encoded and committed to
//! a [`QuestionMatcher`](crate::QuestionMatcher) exactly once.

use bytes::Bytes;

use crate::error::{ResponderError, Result};
use crate::keys::{Answer, Confirm, KeyMap};
use crate::matcher::MatchRule;
use crate::sequencer::AnswerSequencer;

/// A question being composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    key: String,
    rule: MatchRule,
    answers: Vec<Answer>,
    expected_calls: usize,
    submit_override: Option<Bytes>,
}

impl QuestionDraft {
    /// Start a draft for a question, matched by substring.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            rule: MatchRule::default(),
            answers: Vec::new(),
            expected_calls: 0,
            submit_override: None,
        }
    }

    /// Add an answer of any kind.
    #[must_use]
    pub fn answer(mut self, answer: impl Into<Answer>) -> Self {
        self.answers.push(answer.into());
        self
    }

    /// Add a free-text answer.
    #[must_use]
    pub fn response(self, text: impl Into<String>) -> Self {
        self.answer(Answer::Text(text.into()))
    }

    /// Add several free-text answers, dispensed in order.
    #[must_use]
    pub fn responses<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.answers
            .extend(texts.into_iter().map(|t| Answer::Text(t.into())));
        self
    }

    /// Add a confirm answer.
    #[must_use]
    pub fn confirm(self, answer: Confirm) -> Self {
        self.answer(Answer::Confirm(answer))
    }

    /// Add a single-select answer picking option `index`.
    #[must_use]
    pub fn select(self, index: usize) -> Self {
        self.answer(Answer::Select(index))
    }

    /// Add a multi-select answer picking every option in `indices`.
    #[must_use]
    pub fn multi_select(self, indices: impl Into<Vec<usize>>) -> Self {
        self.answer(Answer::MultiSelect(indices.into()))
    }

    /// Set the match rule.
    #[must_use]
    pub const fn rule(mut self, rule: MatchRule) -> Self {
        self.rule = rule;
        self
    }

    /// Match the whole line exactly.
    #[must_use]
    pub const fn exact(self) -> Self {
        self.rule(MatchRule::Exact)
    }

    /// Match when the line contains the question.
    #[must_use]
    pub const fn substring(self) -> Self {
        self.rule(MatchRule::Substring)
    }

    /// Treat the question as a regular expression.
    #[must_use]
    pub const fn regex(self) -> Self {
        self.rule(MatchRule::Regex)
    }

    /// Report a failure if the question is asked more than once.
    #[must_use]
    pub const fn once(self) -> Self {
        self.times(1)
    }

    /// Report a failure if the question is asked more than `times` times.
    ///
    /// `0` means unlimited.
    #[must_use]
    pub const fn times(mut self, times: usize) -> Self {
        self.expected_calls = times;
        self
    }

    /// Send `submit` after each answer instead of the default marker.
    #[must_use]
    pub fn submit_with(mut self, submit: impl Into<Bytes>) -> Self {
        self.submit_override = Some(submit.into());
        self
    }

    /// The question text or pattern.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The match rule.
    #[must_use]
    pub const fn match_rule(&self) -> MatchRule {
        self.rule
    }

    /// The answers added so far.
    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Encode the draft into a key, rule and sequencer ready for registration.
    ///
    /// # Errors
    ///
    /// Fails if the draft has no answers, or a multi-select answer names no
    /// options.
    pub fn finalize(self, keys: &KeyMap) -> Result<(String, MatchRule, AnswerSequencer)> {
        if self.answers.is_empty() {
            return Err(ResponderError::EmptyAnswers { question: self.key });
        }

        let mut sequencer = AnswerSequencer::new();
        let mut submit = self.submit_override;

        for answer in &self.answers {
            let Some(encoded) = answer.encode(keys) else {
                return Err(ResponderError::EmptyMultiSelect { question: self.key });
            };
            sequencer.push(encoded);

            if submit.is_none() {
                submit = answer.submit_override(keys);
            }
        }

        if let Some(submit) = submit {
            sequencer.set_submit_override(submit);
        }
        sequencer.set_expected_calls(self.expected_calls);

        Ok((self.key, self.rule, sequencer))
    }
}

//! Declarative responder scripts.
//!
//! A script is a TOML document listing questions and their answers:
//!
//! ```toml
//! [[question]]
//! text = "What's your name?"
//! match = "exact"
//! answers = ["Ferris"]
//!
//! [[question]]
//! text = "Continue?"
//! kind = "confirm"
//! answers = ["yes"]
//! times = 1
//!
//! [[question]]
//! text = "Toppings"
//! kind = "multi_select"
//! answers = [[0, 2]]
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::draft::QuestionDraft;
use crate::error::{ResponderError, Result};
use crate::keys::Confirm;
use crate::matcher::MatchRule;

/// A parsed script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Script {
    /// The scripted questions, in file order.
    #[serde(rename = "question", default)]
    pub questions: Vec<ScriptQuestion>,
}

/// One `[[question]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptQuestion {
    /// Question text or pattern.
    pub text: String,
    /// How the text is matched.
    #[serde(rename = "match", default)]
    pub rule: MatchRule,
    /// What kind of answers follow.
    #[serde(default)]
    pub kind: AnswerKind,
    /// Answers, dispensed in order.
    pub answers: Vec<ScriptAnswer>,
    /// Call limit; `0` means unlimited.
    #[serde(default)]
    pub times: usize,
}

/// The kind of question a script entry answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    /// Free text.
    #[default]
    Text,
    /// Yes/no.
    Confirm,
    /// One option from a list.
    Select,
    /// Several options from a list.
    MultiSelect,
}

/// A raw answer value as written in the script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScriptAnswer {
    /// `true` / `false`.
    Bool(bool),
    /// A list index.
    Index(usize),
    /// A set of list indices.
    Indices(Vec<usize>),
    /// A string.
    Text(String),
}

impl Script {
    /// Parse a script from TOML text.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a script file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            ResponderError::io_context(format!("reading script {}", path.display()), e)
        })?;
        Self::from_toml_str(&source)
    }

    /// Convert every entry to a question draft.
    ///
    /// # Errors
    ///
    /// Fails if an answer does not fit its question's kind.
    pub fn drafts(&self) -> Result<Vec<QuestionDraft>> {
        self.questions.iter().map(ScriptQuestion::draft).collect()
    }
}

impl ScriptQuestion {
    /// Convert this entry to a question draft.
    pub fn draft(&self) -> Result<QuestionDraft> {
        let mut draft = QuestionDraft::new(self.text.clone())
            .rule(self.rule)
            .times(self.times);

        for answer in &self.answers {
            draft = match (self.kind, answer) {
                (AnswerKind::Text, ScriptAnswer::Text(text)) => draft.response(text.clone()),
                (AnswerKind::Confirm, ScriptAnswer::Bool(value)) => {
                    draft.confirm(Confirm::from(*value))
                }
                (AnswerKind::Confirm, ScriptAnswer::Text(text)) => {
                    let confirm = text.parse::<Confirm>().map_err(|message| {
                        ResponderError::config(format!("question '{}': {message}", self.text))
                    })?;
                    draft.confirm(confirm)
                }
                (AnswerKind::Select, ScriptAnswer::Index(index)) => draft.select(*index),
                (AnswerKind::MultiSelect, ScriptAnswer::Indices(indices)) => {
                    draft.multi_select(indices.clone())
                }
                (kind, other) => {
                    return Err(ResponderError::config(format!(
                        "question '{}': answer {other:?} does not fit kind {kind:?}",
                        self.text
                    )));
                }
            };
        }

        Ok(draft)
    }
}

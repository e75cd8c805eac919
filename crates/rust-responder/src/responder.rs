//! The caller-facing responder builder.
//!
//! # Example
//!
//! ```no_run
//! use rust_responder::{Confirm, Failures, Responder};
//!
//! # async fn demo() -> rust_responder::Result<()> {
//! let failures = Failures::new();
//! let session = Responder::new()
//!     .add_response("What's your name?", "Ferris")
//!     .match_exact()
//!     .add_confirm("Continue?", Confirm::Affirm)
//!     .respond_once()
//!     .add_select("Pick a shell", 2)
//!     .start(failures.clone())?;
//!
//! let (input, output, _handle) = session.into_parts();
//! // hand `input` and `output` to the form under test
//! # drop((input, output));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::config::{EnvConfig, SessionConfig};
use crate::draft::QuestionDraft;
use crate::error::{ResponderError, Result};
use crate::keys::{Confirm, KeyMap};
use crate::matcher::QuestionMatcher;
use crate::report::Reporter;
use crate::script::Script;
use crate::session::Session;

/// Builder for a scripted responder session.
///
/// Each `add_*` call commits the question being composed and starts a new
/// one. The `match_*` and `respond_*` modifiers apply to the question most
/// recently started. Configuration faults are remembered and returned by
/// [`Responder::start`].
///
/// [`Responder::new`] uses the built-in defaults and ignores the process
/// environment; use [`Responder::from_env`] or [`Responder::env`] to honour
/// `RESPONDER_DEADLINE_MS` and `RESPONDER_SUBMIT_DELAY_MS`.
#[derive(Debug, Default)]
pub struct Responder {
    matcher: QuestionMatcher,
    config: SessionConfig,
    pending: Option<QuestionDraft>,
    error: Option<ResponderError>,
}

impl Responder {
    /// Create a responder with no questions and the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a responder with environment overrides applied to the default
    /// configuration.
    ///
    /// An unparsable variable is returned by [`Responder::start`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::new().env(&EnvConfig::default())
    }

    /// Create a responder from `(question, answers)` pairs.
    ///
    /// Every question is matched by substring.
    #[must_use]
    pub fn with_responses<I, Q, A, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = (Q, A)>,
        Q: Into<String>,
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        responses
            .into_iter()
            .fold(Self::new(), |responder, (question, answers)| {
                responder.add_responses(question, answers)
            })
    }

    /// Answer `question` with free text.
    #[must_use]
    pub fn add_response(self, question: impl Into<String>, answer: impl Into<String>) -> Self {
        self.begin(QuestionDraft::new(question).response(answer))
    }

    /// Answer successive askings of `question` with the given texts in order.
    #[must_use]
    pub fn add_responses<I, S>(self, question: impl Into<String>, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.begin(QuestionDraft::new(question).responses(answers))
    }

    /// Answer a confirm question.
    #[must_use]
    pub fn add_confirm(self, question: impl Into<String>, answer: impl Into<Confirm>) -> Self {
        self.begin(QuestionDraft::new(question).confirm(answer.into()))
    }

    /// Answer a single-select question with the option at `index`.
    #[must_use]
    pub fn add_select(self, question: impl Into<String>, index: usize) -> Self {
        self.begin(QuestionDraft::new(question).select(index))
    }

    /// Answer a multi-select question with the options at `indices`.
    #[must_use]
    pub fn add_multi_select(
        self,
        question: impl Into<String>,
        indices: impl Into<Vec<usize>>,
    ) -> Self {
        self.begin(QuestionDraft::new(question).multi_select(indices))
    }

    /// Match the current question against the whole line.
    #[must_use]
    pub fn match_exact(self) -> Self {
        self.modify(QuestionDraft::exact)
    }

    /// Treat the current question as a regular expression.
    #[must_use]
    pub fn match_regexp(self) -> Self {
        self.modify(QuestionDraft::regex)
    }

    /// Report a failure if the current question is asked more than once.
    #[must_use]
    pub fn respond_once(self) -> Self {
        self.modify(QuestionDraft::once)
    }

    /// Report a failure if the current question is asked more than `times`
    /// times.
    #[must_use]
    pub fn respond_times(self, times: usize) -> Self {
        self.modify(|draft| draft.times(times))
    }

    /// Register a fully built question.
    #[must_use]
    pub fn question(mut self, draft: QuestionDraft) -> Self {
        self.commit();
        self.register(draft);
        self
    }

    /// Register every question of a declarative script.
    #[must_use]
    pub fn script(mut self, script: &Script) -> Self {
        self.commit();
        match script.drafts() {
            Ok(drafts) => {
                for draft in drafts {
                    self.register(draft);
                }
            }
            Err(e) => self.record(e),
        }
        self
    }

    /// Replace the whole session configuration.
    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Apply overrides from an environment reader to the current configuration.
    #[must_use]
    pub fn env(mut self, env: &EnvConfig) -> Self {
        match self.config.clone().with_env(env) {
            Ok(config) => self.config = config,
            Err(e) => self.record(e),
        }
        self
    }

    /// Set how long the session may run.
    #[must_use]
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.config = self.config.deadline(deadline);
        self
    }

    /// Set the pause between an answer and its submit marker.
    #[must_use]
    pub fn submit_delay(mut self, delay: Duration) -> Self {
        self.config = self.config.submit_delay(delay);
        self
    }

    /// Set the key map used to encode answers.
    ///
    /// Questions already committed keep the encoding they were built with.
    #[must_use]
    pub fn keys(mut self, keys: KeyMap) -> Self {
        self.config = self.config.keys(keys);
        self
    }

    /// The session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Commit the pending question and return the matcher.
    ///
    /// # Errors
    ///
    /// Returns the first configuration fault recorded while building.
    pub fn into_matcher(mut self) -> Result<QuestionMatcher> {
        self.commit();
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.matcher),
        }
    }

    /// Commit the pending question and start answering in the background.
    ///
    /// Runtime faults (overruns, write failures, the deadline) are sent to
    /// `reporter`. The returned [`Session`] carries the two streams for the
    /// program under test and the control handle.
    ///
    /// # Errors
    ///
    /// Returns the first configuration fault recorded while building, such
    /// as an invalid regex or a question without answers. Nothing is spawned
    /// in that case.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(self, reporter: impl Reporter) -> Result<Session> {
        let config = self.config.clone();
        let matcher = self.into_matcher()?;
        let reporter: Arc<dyn Reporter> = Arc::new(reporter);
        Ok(Session::spawn(matcher, config, reporter))
    }

    fn begin(mut self, draft: QuestionDraft) -> Self {
        self.commit();
        self.pending = Some(draft);
        self
    }

    fn modify(mut self, f: impl FnOnce(QuestionDraft) -> QuestionDraft) -> Self {
        self.pending = self.pending.take().map(f);
        self
    }

    fn commit(&mut self) {
        if let Some(draft) = self.pending.take() {
            self.register(draft);
        }
    }

    fn register(&mut self, draft: QuestionDraft) {
        let result = draft
            .finalize(&self.config.keys)
            .and_then(|(key, rule, sequencer)| self.matcher.register(key, rule, sequencer));
        if let Err(e) = result {
            self.record(e);
        }
    }

    fn record(&mut self, error: ResponderError) {
        tracing::debug!(error = %error, "responder configuration fault");
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

//! The session driver.
//!
//! A running session owns two background tasks:
//!
//! - the **driver** reads question lines, resolves them against the
//!   [`QuestionMatcher`], and writes the scripted answer followed by its
//!   submit marker;
//! - the **watchdog** sleeps for the configured deadline and, unless the
//!   session was cancelled first, reports a failure and closes both streams.
//!
//! The tasks coordinate only through the streams: closing them makes the
//! driver's pending read fail, which ends its loop.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::config::SessionConfig;
use crate::error::ResponderError;
use crate::matcher::QuestionMatcher;
use crate::pipe::{PipeCloser, PipeReader, PipeWriter, pipe};
use crate::report::Reporter;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Not started yet.
    Idle,
    /// Answering questions.
    Running,
    /// Stopped by [`SessionHandle::cancel`].
    Cancelled,
    /// Stopped by the watchdog when the deadline expired.
    TimedOut,
    /// The question stream ended or failed.
    StreamClosed,
}

impl SessionState {
    /// Check if this is a final state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::TimedOut | Self::StreamClosed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timed out",
            Self::StreamClosed => "stream closed",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
struct LifecycleInner {
    state: SessionState,
    cancelled: bool,
    expired: bool,
}

/// Shared view of the session state; the first terminal transition wins.
#[derive(Debug)]
struct Lifecycle {
    inner: Mutex<LifecycleInner>,
}

impl Lifecycle {
    const fn new() -> Self {
        Self {
            inner: Mutex::new(LifecycleInner {
                state: SessionState::Idle,
                cancelled: false,
                expired: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LifecycleInner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn state(&self) -> SessionState {
        self.lock().state
    }

    fn start(&self) {
        let mut inner = self.lock();
        if inner.state == SessionState::Idle {
            inner.state = SessionState::Running;
        }
    }

    fn finish(inner: &mut LifecycleInner, to: SessionState) {
        if !inner.state.is_terminal() {
            inner.state = to;
        }
    }

    /// Returns `true` on the first call.
    fn cancel(&self) -> bool {
        let mut inner = self.lock();
        let first = !inner.cancelled;
        inner.cancelled = true;
        Self::finish(&mut inner, SessionState::Cancelled);
        first
    }

    /// Returns `true` if the deadline should be reported.
    fn expire(&self) -> bool {
        let mut inner = self.lock();
        if inner.cancelled || inner.expired {
            return false;
        }
        inner.expired = true;
        Self::finish(&mut inner, SessionState::TimedOut);
        true
    }

    fn stream_closed(&self) {
        Self::finish(&mut self.lock(), SessionState::StreamClosed);
    }
}

/// Closes both streams of a session at once.
#[derive(Debug, Clone)]
struct Closers {
    questions: PipeCloser,
    answers: PipeCloser,
}

impl Closers {
    fn close(&self) {
        self.answers.close();
        self.questions.close();
    }

    fn is_closed(&self) -> bool {
        self.answers.is_closed() && self.questions.is_closed()
    }
}

fn next_session_id() -> u64 {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A running responder session.
///
/// The driven program reads its keystrokes from [`Session::input`] and
/// writes its questions to [`Session::output`].
#[derive(Debug)]
pub struct Session {
    input: PipeReader,
    output: PipeWriter,
    handle: SessionHandle,
}

impl Session {
    /// Launch the driver and watchdog for a configured matcher.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub(crate) fn spawn(
        matcher: QuestionMatcher,
        config: SessionConfig,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let id = next_session_id();
        let (answer_writer, input) = pipe();
        let (output, question_reader) = pipe();

        let closers = Closers {
            questions: question_reader.closer(),
            answers: answer_writer.closer(),
        };

        let lifecycle = Arc::new(Lifecycle::new());
        lifecycle.start();

        tracing::info!(
            session = id,
            questions = matcher.len(),
            deadline = ?config.deadline,
            "starting responder session"
        );

        let span = tracing::info_span!("responder_session", id);

        let watchdog = tokio::spawn(
            watchdog(
                config.deadline,
                Arc::clone(&lifecycle),
                closers.clone(),
                Arc::clone(&reporter),
            )
            .instrument(span.clone()),
        );

        let driver = tokio::spawn(
            Driver {
                matcher,
                config,
                reporter,
            }
            .run(question_reader, answer_writer, Arc::clone(&lifecycle))
            .instrument(span),
        );

        Self {
            input,
            output,
            handle: SessionHandle {
                id,
                lifecycle,
                closers,
                watchdog,
                driver: Some(driver),
            },
        }
    }

    /// The stream the driven program reads keystrokes from.
    pub fn input(&mut self) -> &mut PipeReader {
        &mut self.input
    }

    /// The stream the driven program writes questions to.
    pub fn output(&mut self) -> &mut PipeWriter {
        &mut self.output
    }

    /// The control handle.
    #[must_use]
    pub const fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    /// Mutable access to the control handle.
    pub fn handle_mut(&mut self) -> &mut SessionHandle {
        &mut self.handle
    }

    /// Cancel the session. See [`SessionHandle::cancel`].
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    /// Split into the program's input, the program's output and the handle.
    #[must_use]
    pub fn into_parts(self) -> (PipeReader, PipeWriter, SessionHandle) {
        (self.input, self.output, self.handle)
    }
}

/// Controls a running session.
///
/// Dropping the handle cancels the session.
pub struct SessionHandle {
    id: u64,
    lifecycle: Arc<Lifecycle>,
    closers: Closers,
    watchdog: JoinHandle<()>,
    driver: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Stop the session now.
    ///
    /// Closes both streams and stops the watchdog. Cancelling is not a
    /// failure and reports nothing. Calling it again, or after the session
    /// already ended, does nothing harmful.
    pub fn cancel(&self) {
        if self.lifecycle.cancel() {
            tracing::debug!(session = self.id, "cancelling responder session");
        }
        self.watchdog.abort();
        self.closers.close();
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lifecycle.state()
    }

    /// Check if both streams have been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closers.is_closed()
    }

    /// The session identifier used in log events.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Wait until the driver loop has exited and return the final state.
    pub async fn finished(&mut self) -> SessionState {
        if let Some(driver) = self.driver.take() {
            if let Err(e) = driver.await {
                tracing::warn!(session = self.id, error = %e, "responder driver task failed");
            }
        }
        self.state()
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn watchdog(
    deadline: Duration,
    lifecycle: Arc<Lifecycle>,
    closers: Closers,
    reporter: Arc<dyn Reporter>,
) {
    tokio::time::sleep(deadline).await;

    if !lifecycle.expire() {
        return;
    }

    let err = ResponderError::DeadlineReached { deadline };
    tracing::warn!(?deadline, "responder deadline reached");
    reporter.fail(&err.to_string());
    closers.close();
}

/// The read/resolve/write loop. Sole owner of the matcher while running.
struct Driver {
    matcher: QuestionMatcher,
    config: SessionConfig,
    reporter: Arc<dyn Reporter>,
}

impl Driver {
    async fn run(
        mut self,
        questions: PipeReader,
        mut answers: PipeWriter,
        lifecycle: Arc<Lifecycle>,
    ) {
        let mut questions = BufReader::new(questions);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match questions.read_until(b'\n', &mut buf).await {
                Ok(0) => {
                    tracing::debug!("question stream ended");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "question stream closed");
                    break;
                }
            }

            let line = decode_line(&buf);
            tracing::debug!(line = %line, "got line");

            self.answer(&line, &mut answers).await;
        }

        lifecycle.stream_closed();
        tracing::info!(state = %lifecycle.state(), "responder session finished");
    }

    async fn answer(&mut self, line: &str, answers: &mut PipeWriter) {
        let Some(question) = self.matcher.resolve(line) else {
            return;
        };
        let key = question.key().to_string();
        tracing::debug!(question = %key, rule = %question.rule(), "matches question");

        let sequencer = question.sequencer_mut();
        let Some(dispensed) = sequencer.dispense() else {
            return;
        };
        let submit = sequencer.submit(&self.config.keys.submit).clone();

        if let Some(overrun) = dispensed.overrun {
            let err = ResponderError::overrun(&key, overrun.calls, overrun.expected);
            tracing::warn!(
                question = %key,
                calls = overrun.calls,
                expected = overrun.expected,
                "question asked too often"
            );
            self.reporter.fail(&err.to_string());
        }

        tracing::debug!(reply = %self.config.keys.readable(&dispensed.answer), "replying");
        self.write(answers, &dispensed.answer, "writing answer", &key)
            .await;

        tokio::time::sleep(self.config.submit_delay).await;

        tracing::debug!(submit = %self.config.keys.readable(&submit), "sending submit marker");
        self.write(answers, &submit, "writing submit marker", &key)
            .await;
    }

    async fn write(&self, answers: &mut PipeWriter, data: &[u8], what: &str, key: &str) {
        if let Err(e) = answers.write_all(data).await {
            let err = ResponderError::io_context(format!("{what} for '{key}'"), e);
            tracing::warn!(error = %err, "write failed");
            self.reporter.fail(&err.to_string());
        }
    }
}

/// Strip the line terminator (`\n` or `\r\n`) and decode lossily.
fn decode_line(buf: &[u8]) -> String {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

//! Error types for rust-responder.
//!
//! Configuration faults are returned from [`Responder::start`](crate::Responder::start)
//! before any background work begins. Runtime faults never cross the session
//! boundary as `Err` values; the driver renders them into messages for the
//! caller's [`Reporter`](crate::Reporter).

use std::time::Duration;

use thiserror::Error;

/// The main error type for rust-responder operations.
#[derive(Debug, Error)]
pub enum ResponderError {
    /// A regex question could not be compiled.
    #[error("invalid regex question '{pattern}': {source}")]
    InvalidRegex {
        /// The pattern text as registered.
        pattern: String,
        /// The underlying compile error.
        #[source]
        source: regex::Error,
    },

    /// A question was committed without any answers.
    #[error("question '{question}' has no answers")]
    EmptyAnswers {
        /// The question key.
        question: String,
    },

    /// A multi-select answer did not name any option.
    #[error("multi-select answer for '{question}' selects no options")]
    EmptyMultiSelect {
        /// The question key.
        question: String,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// A declarative script could not be parsed.
    #[error("invalid script: {0}")]
    Script(#[from] toml::de::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An I/O error occurred with additional context.
    #[error("{context}: {source}")]
    IoWithContext {
        /// What operation was being performed.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A stream was used after it was closed.
    #[error("stream is closed")]
    Closed,

    /// A question was asked more often than it was expected to be.
    #[error("question '{question}' called {calls}/{expected} times: ran out of responses")]
    Overrun {
        /// The question key that matched.
        question: String,
        /// The number of calls including the current one.
        calls: usize,
        /// The expected call limit.
        expected: usize,
    },

    /// The session deadline expired before it was cancelled.
    #[error("deadline of {deadline:?} reached, closing readers and writers")]
    DeadlineReached {
        /// The configured deadline.
        deadline: Duration,
    },
}

/// Result type alias for rust-responder operations.
pub type Result<T> = std::result::Result<T, ResponderError>;

impl ResponderError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_context(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoWithContext {
            context: context.into(),
            source,
        }
    }

    /// Create an overrun error.
    pub fn overrun(question: impl Into<String>, calls: usize, expected: usize) -> Self {
        Self::Overrun {
            question: question.into(),
            calls,
            expected,
        }
    }

    /// Check if this is a configuration-time fault.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidRegex { .. }
                | Self::EmptyAnswers { .. }
                | Self::EmptyMultiSelect { .. }
                | Self::Config { .. }
                | Self::Script(_)
        )
    }

    /// Check if this error was caused by a closed stream.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self {
            Self::Closed => true,
            Self::Io(e) | Self::IoWithContext { source: e, .. } => {
                e.kind() == std::io::ErrorKind::BrokenPipe
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrun_display() {
        let err = ResponderError::overrun("right?", 2, 1);
        let msg = err.to_string();
        assert!(msg.contains("right?"));
        assert!(msg.contains("2/1"));
        assert!(msg.contains("ran out of responses"));
    }

    #[test]
    fn invalid_regex_is_config() {
        let source = regex::Regex::new("[unclosed").unwrap_err();
        let err = ResponderError::InvalidRegex {
            pattern: "[unclosed".to_string(),
            source,
        };
        assert!(err.is_config());
        assert!(err.to_string().contains("[unclosed"));
    }

    #[test]
    fn broken_pipe_is_closed() {
        let err = ResponderError::io_context(
            "writing answer",
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"),
        );
        assert!(err.is_closed());
        assert!(err.to_string().contains("writing answer"));

        let other = ResponderError::Io(std::io::Error::other("boom"));
        assert!(!other.is_closed());
    }

    #[test]
    fn deadline_display() {
        let err = ResponderError::DeadlineReached {
            deadline: Duration::from_millis(5),
        };
        assert!(err.to_string().contains("deadline"));
        assert!(!err.is_config());
    }
}

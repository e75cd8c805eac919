//! Configuration types for rust-responder.
//!
//! This module defines the session configuration: how long a session may run,
//! how long to pause between an answer and its submit marker, and which
//! control bytes the driven prompt toolkit understands.

pub mod env;

use std::time::Duration;

use crate::error::Result;
use crate::keys::KeyMap;

pub use env::EnvConfig;

/// Default session deadline (10 seconds).
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// Default pause between writing an answer and its submit marker.
///
/// Forms that read keystrokes in batches can merge an answer with its
/// submit marker when both arrive at once.
pub const DEFAULT_SUBMIT_DELAY: Duration = Duration::from_millis(20);

/// Configuration for a responder session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long the session may run before it is forcibly closed.
    pub deadline: Duration,

    /// Pause between an answer and its submit marker.
    pub submit_delay: Duration,

    /// Control bytes of the driven prompt toolkit.
    pub keys: KeyMap,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
            submit_delay: DEFAULT_SUBMIT_DELAY,
            keys: KeyMap::default(),
        }
    }
}

impl SessionConfig {
    /// Create a configuration with the given deadline.
    #[must_use]
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            ..Default::default()
        }
    }

    /// Create the default configuration with environment overrides applied.
    ///
    /// See [`EnvConfig`] for the recognised variables.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env(&EnvConfig::default())
    }

    /// Apply overrides from an environment reader.
    pub fn with_env(mut self, env: &EnvConfig) -> Result<Self> {
        if let Some(deadline) = env.duration_millis(env::vars::DEADLINE_MS)? {
            self.deadline = deadline;
        }
        if let Some(delay) = env.duration_millis(env::vars::SUBMIT_DELAY_MS)? {
            self.submit_delay = delay;
        }
        Ok(self)
    }

    /// Set the deadline.
    #[must_use]
    pub const fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set the pause between an answer and its submit marker.
    #[must_use]
    pub const fn submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    /// Set the key map.
    #[must_use]
    pub fn keys(mut self, keys: KeyMap) -> Self {
        self.keys = keys;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.deadline, DEFAULT_DEADLINE);
        assert_eq!(config.submit_delay, Duration::from_millis(20));
        assert_eq!(config.keys, KeyMap::default());
    }

    #[test]
    fn builder_methods() {
        let config = SessionConfig::new(Duration::from_secs(1)).submit_delay(Duration::ZERO);
        assert_eq!(config.deadline, Duration::from_secs(1));
        assert_eq!(config.submit_delay, Duration::ZERO);
    }

    #[test]
    fn env_overrides() {
        let env = EnvConfig::with_lookup("RESPONDER", |name| match name {
            "RESPONDER_DEADLINE_MS" => Some("250".to_string()),
            _ => None,
        });
        let config = SessionConfig::default().with_env(&env).unwrap();
        assert_eq!(config.deadline, Duration::from_millis(250));
        assert_eq!(config.submit_delay, DEFAULT_SUBMIT_DELAY);
    }

    #[test]
    fn env_invalid_value() {
        let env = EnvConfig::with_lookup("RESPONDER", |name| {
            (name == "RESPONDER_SUBMIT_DELAY_MS").then(|| "soon".to_string())
        });
        let err = SessionConfig::default().with_env(&env).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("RESPONDER_SUBMIT_DELAY_MS"));
    }
}

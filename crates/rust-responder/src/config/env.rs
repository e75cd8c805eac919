//! Environment-based configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ResponderError, Result};

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "RESPONDER";

type Lookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Environment variable reader.
///
/// Reads the process environment by default; [`EnvConfig::with_lookup`]
/// swaps in any other source, which keeps tests away from global state.
#[derive(Clone)]
pub struct EnvConfig {
    prefix: String,
    lookup: Lookup,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvConfig")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl EnvConfig {
    /// Create a reader over the process environment.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_lookup(prefix, |name| std::env::var(name).ok())
    }

    /// Create a reader over a custom variable source.
    pub fn with_lookup<F>(prefix: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            prefix: prefix.into(),
            lookup: Arc::new(lookup),
        }
    }

    /// Build the full environment variable name.
    fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a string value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(&self.var_name(name))
    }

    /// Get a parsed value, failing if it is set but does not parse.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>> {
        let Some(raw) = self.get(name) else {
            return Ok(None);
        };
        raw.trim().parse().map(Some).map_err(|_| {
            ResponderError::config(format!(
                "invalid value '{raw}' for {}",
                self.var_name(name)
            ))
        })
    }

    /// Get a duration in milliseconds.
    pub fn duration_millis(&self, name: &str) -> Result<Option<Duration>> {
        Ok(self.parse::<u64>(name)?.map(Duration::from_millis))
    }

    /// Check if a variable is set.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Recognised variable names (without prefix).
pub mod vars {
    /// Session deadline in milliseconds.
    pub const DEADLINE_MS: &str = "DEADLINE_MS";
    /// Pause between answer and submit marker in milliseconds.
    pub const SUBMIT_DELAY_MS: &str = "SUBMIT_DELAY_MS";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_names() {
        let env = EnvConfig::with_lookup("APP", |name| (name == "APP_X").then(|| "1".into()));
        assert!(env.is_set("x"));
        assert!(!env.is_set("y"));
        assert_eq!(env.parse::<u8>("x").unwrap(), Some(1));
    }

    #[test]
    fn unprefixed_names() {
        let env = EnvConfig::with_lookup("", |name| (name == "X").then(|| " 7 ".into()));
        assert_eq!(env.duration_millis("x").unwrap(), Some(Duration::from_millis(7)));
    }

    #[test]
    fn missing_is_none() {
        let env = EnvConfig::with_lookup(DEFAULT_PREFIX, |_| None);
        assert_eq!(env.duration_millis(vars::DEADLINE_MS).unwrap(), None);
    }
}

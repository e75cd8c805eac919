//! Convenient re-exports for common usage.
//!
//! ```
//! use rust_responder::prelude::*;
//! ```

pub use crate::config::SessionConfig;
pub use crate::draft::QuestionDraft;
pub use crate::error::{ResponderError, Result};
pub use crate::keys::{Confirm, KeyMap};
pub use crate::matcher::MatchRule;
pub use crate::report::{Failures, Reporter};
pub use crate::responder::Responder;
pub use crate::script::Script;
pub use crate::session::{Session, SessionHandle, SessionState};
pub use crate::testing::FormSimulator;

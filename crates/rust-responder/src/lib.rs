//! rust-responder: Scripted answers for interactive terminal forms
//!
//! This crate provides a test double for programs that ask questions on a
//! terminal. Register the questions you expect and the answers to give, hand
//! the program the session's two streams, and the responder types the
//! answers as keystrokes while the program runs.
//!
//! # Features
//!
//! - **Three match rules**: exact line, substring (the default) and regex
//! - **Answer sequences**: successive askings get successive answers, the
//!   last one repeats, and optional call limits flag over-asking
//! - **Keystroke encoding** for free text, confirm, single and multi select
//! - **Deadline watchdog** and explicit cancellation
//! - **Declarative scripts** in TOML
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use rust_responder::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let failures = Failures::new();
//!     let session = Responder::new()
//!         .add_responses("alright?", ["yes", "no"])
//!         .add_select("Favourite colour", 1)
//!         .deadline(Duration::from_secs(5))
//!         .start(failures.clone())?;
//!
//!     let (mut form, handle) = FormSimulator::from_session(session);
//!     assert_eq!(form.ask("alright?").await?, "yes");
//!     assert_eq!(form.ask("Favourite colour").await?, "<down>");
//!
//!     handle.cancel();
//!     failures.assert_ok();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod draft;
pub mod error;
pub mod keys;
pub mod matcher;
pub mod pipe;
pub mod prelude;
pub mod report;
pub mod responder;
pub mod script;
pub mod sequencer;
pub mod session;
pub mod testing;

pub use config::{EnvConfig, SessionConfig};
pub use draft::QuestionDraft;
pub use error::{ResponderError, Result};
pub use keys::{Answer, Confirm, KeyMap, readable};
pub use matcher::{MatchRule, QuestionMatcher, RegisteredQuestion};
pub use pipe::{PipeCloser, PipeReader, PipeWriter, pipe};
pub use report::{Failures, Reporter};
pub use responder::Responder;
pub use script::Script;
pub use sequencer::{AnswerSequencer, Dispensed, Overrun};
pub use session::{Session, SessionHandle, SessionState};
pub use testing::FormSimulator;

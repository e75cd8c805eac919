//! Helpers for testing code against a responder session.
//!
//! [`FormSimulator`] plays the part of an interactive form: it prints a
//! question and reads back whatever the responder typed.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::error::{ResponderError, Result};
use crate::pipe::{PipeReader, PipeWriter};
use crate::session::{Session, SessionHandle};

pub use crate::keys::readable;

/// A stand-in for a terminal form driven by a responder.
#[derive(Debug)]
pub struct FormSimulator {
    input: BufReader<PipeReader>,
    output: PipeWriter,
}

impl FormSimulator {
    /// Create a simulator reading keystrokes from `input` and printing
    /// questions to `output`.
    #[must_use]
    pub fn new(input: PipeReader, output: PipeWriter) -> Self {
        Self {
            input: BufReader::new(input),
            output,
        }
    }

    /// Attach a simulator to a started session.
    #[must_use]
    pub fn from_session(session: Session) -> (Self, SessionHandle) {
        let (input, output, handle) = session.into_parts();
        (Self::new(input, output), handle)
    }

    /// Print a line that is not expected to be answered.
    pub async fn say(&mut self, line: &str) -> Result<()> {
        self.output.write_all(line.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        Ok(())
    }

    /// Print `question` and return the raw reply, up to and including the
    /// final carriage return of its submit marker.
    ///
    /// A newline left over from the previous reply's submit marker is
    /// dropped.
    pub async fn ask_raw(&mut self, question: &str) -> Result<Vec<u8>> {
        self.say(question).await?;

        let mut reply = Vec::new();
        self.input.read_until(b'\r', &mut reply).await?;
        if reply.last() != Some(&b'\r') {
            return Err(ResponderError::Closed);
        }
        if reply.first() == Some(&b'\n') {
            reply.remove(0);
        }
        Ok(reply)
    }

    /// Print `question` and return the reply without its submit marker,
    /// rendered with [`readable`].
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        let reply = self.ask_raw(question).await?;
        let answer = reply.strip_suffix(b"\r").unwrap_or(&reply);
        Ok(readable(answer))
    }

    /// Stop printing questions; the responder sees end of stream.
    pub async fn finish(mut self) -> Result<()> {
        self.output.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipe::pipe;

    #[tokio::test]
    async fn ask_strips_submit_and_leftover_newline() {
        let (mut keys, input) = pipe();
        let (output, _questions) = pipe();
        let mut form = FormSimulator::new(input, output);

        keys.write_all(b"first\r\n\x1b[B\r").await.unwrap();

        assert_eq!(form.ask("one?").await.unwrap(), "first");
        assert_eq!(form.ask("two?").await.unwrap(), "<down>");
    }

    #[tokio::test]
    async fn ask_on_ended_stream_is_closed() {
        let (keys, input) = pipe();
        let (output, _questions) = pipe();
        let mut form = FormSimulator::new(input, output);
        drop(keys);

        let err = form.ask("anyone?").await.unwrap_err();
        assert!(err.is_closed());
    }
}

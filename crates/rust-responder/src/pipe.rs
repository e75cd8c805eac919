//! In-memory async byte pipes.
//!
//! A pipe has a writer half and a reader half, plus any number of
//! [`PipeCloser`] handles that can close it from the outside. Closing is how a
//! session is torn down: it unblocks a pending read and makes every later read
//! or write on either half fail with [`io::ErrorKind::BrokenPipe`].

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll, Waker};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

#[derive(Debug, Default)]
struct PipeState {
    data: VecDeque<u8>,
    /// Forcibly closed; every operation fails.
    closed: bool,
    /// The writer went away; the reader sees EOF once drained.
    writer_gone: bool,
    /// The reader went away; writes fail.
    reader_gone: bool,
    read_waker: Option<Waker>,
}

impl PipeState {
    fn wake_reader(&mut self) {
        if let Some(waker) = self.read_waker.take() {
            waker.wake();
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<PipeState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PipeState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed")
}

/// Create a connected pipe.
#[must_use]
pub fn pipe() -> (PipeWriter, PipeReader) {
    let shared = Arc::new(Shared::default());
    (
        PipeWriter {
            shared: Arc::clone(&shared),
        },
        PipeReader { shared },
    )
}

/// The writing half of a pipe.
pub struct PipeWriter {
    shared: Arc<Shared>,
}

impl PipeWriter {
    /// Get a handle that can close this pipe.
    #[must_use]
    pub fn closer(&self) -> PipeCloser {
        PipeCloser {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Check if the pipe has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}

impl fmt::Debug for PipeWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeWriter")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl AsyncWrite for PipeWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut state = self.shared.lock();
        if state.closed || state.reader_gone {
            return Poll::Ready(Err(closed_error()));
        }
        state.data.extend(buf);
        state.wake_reader();
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        if self.shared.lock().closed {
            return Poll::Ready(Err(closed_error()));
        }
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let mut state = self.shared.lock();
        state.writer_gone = true;
        state.wake_reader();
        Poll::Ready(Ok(()))
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.writer_gone = true;
        state.wake_reader();
    }
}

/// The reading half of a pipe.
pub struct PipeReader {
    shared: Arc<Shared>,
}

impl PipeReader {
    /// Get a handle that can close this pipe.
    #[must_use]
    pub fn closer(&self) -> PipeCloser {
        PipeCloser {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Check if the pipe has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}

impl fmt::Debug for PipeReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeReader")
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl AsyncRead for PipeReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut state = self.shared.lock();

        if state.closed {
            return Poll::Ready(Err(closed_error()));
        }

        if !state.data.is_empty() {
            let len = buf.remaining().min(state.data.len());
            let (front, back) = state.data.as_slices();
            if len <= front.len() {
                buf.put_slice(&front[..len]);
            } else {
                buf.put_slice(front);
                buf.put_slice(&back[..len - front.len()]);
            }
            state.data.drain(..len);
            return Poll::Ready(Ok(()));
        }

        if state.writer_gone {
            return Poll::Ready(Ok(()));
        }

        state.read_waker = Some(cx.waker().clone());
        Poll::Pending
    }
}

impl Drop for PipeReader {
    fn drop(&mut self) {
        self.shared.lock().reader_gone = true;
    }
}

/// A handle that closes a pipe from outside either half.
#[derive(Clone)]
pub struct PipeCloser {
    shared: Arc<Shared>,
}

impl PipeCloser {
    /// Close the pipe. Closing an already-closed pipe does nothing.
    ///
    /// Buffered data is discarded and a pending reader is woken.
    pub fn close(&self) {
        let mut state = self.shared.lock();
        state.closed = true;
        state.data.clear();
        state.wake_reader();
    }

    /// Check if the pipe has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }
}

impl fmt::Debug for PipeCloser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeCloser")
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn write_then_read() {
        let (mut writer, mut reader) = pipe();
        writer.write_all(b"hello").await.unwrap();

        let mut buf = [0u8; 10];
        let n = reader.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"hello");
    }

    #[tokio::test]
    async fn dropped_writer_is_eof() {
        let (mut writer, mut reader) = pipe();
        writer.write_all(b"last").await.unwrap();
        drop(writer);

        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"last");
    }

    #[tokio::test]
    async fn close_fails_both_halves() {
        let (mut writer, mut reader) = pipe();
        let closer = writer.closer();
        closer.close();
        closer.close();

        let mut buf = [0u8; 1];
        let err = reader.read(&mut buf).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        let err = writer.write(b"x").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(reader.is_closed());
    }

    #[tokio::test]
    async fn close_wakes_pending_reader() {
        let (_writer, mut reader) = pipe();
        let closer = reader.closer();

        let pending = tokio::spawn(async move {
            let mut buf = [0u8; 4];
            reader.read(&mut buf).await
        });

        tokio::task::yield_now().await;
        closer.close();

        let result = pending.await.unwrap();
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn write_after_reader_dropped_fails() {
        let (mut writer, reader) = pipe();
        drop(reader);
        assert!(writer.write_all(b"x").await.is_err());
    }
}

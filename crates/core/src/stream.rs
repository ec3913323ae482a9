//! Streaming listing handoff
//!
//! A streaming listing runs as a producer task that owns the response body
//! and hands decoded records to the caller through a one-slot channel. The
//! caller holds a [`ListStream`]; the producer holds a [`ListSender`].
//!
//! Termination is explicit:
//! - the producer reaches the end of the body and reports completion,
//! - the producer fails to decode a record and reports the error once,
//! - the caller cancels, after which no further record is yielded even if
//!   one is already buffered.

use futures::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::model::ListEntry;

/// How a streaming listing ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    Completed,
    Cancelled,
    Failed,
}

enum Frame {
    Entry(ListEntry),
    Failed(Error),
    Done,
}

/// Create a connected sender/stream pair
///
/// The stream observes a child of `cancel`: cancelling the caller's token
/// stops the stream, while dropping the stream never cancels the caller's token.
pub fn list_channel(cancel: &CancellationToken) -> (ListSender, ListStream) {
    let (tx, rx) = mpsc::channel(1);
    let token = cancel.child_token();
    (
        ListSender {
            tx,
            cancel: token.clone(),
        },
        ListStream {
            rx,
            cancel: token,
            outcome: None,
        },
    )
}

/// Producer half of a streaming listing
pub struct ListSender {
    tx: mpsc::Sender<Frame>,
    cancel: CancellationToken,
}

impl ListSender {
    /// Hand one record to the consumer, waiting for the slot to free up
    ///
    /// Returns `false` when the consumer cancelled or went away; the
    /// producer must stop reading.
    pub async fn send(&self, entry: ListEntry) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.tx.send(Frame::Entry(entry)) => sent.is_ok(),
        }
    }

    /// Report a terminal failure
    pub async fn fail(self, error: Error) {
        self.finish(Frame::Failed(error)).await;
    }

    /// Report a clean end of stream
    pub async fn complete(self) {
        self.finish(Frame::Done).await;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token the producer must watch between records
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    async fn finish(self, frame: Frame) {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {}
            _ = self.tx.send(frame) => {}
        }
    }
}

/// Consumer half of a streaming listing
///
/// Not restartable: once it ends, resume with a new listing from the last
/// marker seen.
pub struct ListStream {
    rx: mpsc::Receiver<Frame>,
    cancel: CancellationToken,
    outcome: Option<StreamOutcome>,
}

impl ListStream {
    /// A stream that ended before any record was produced
    pub fn finished(outcome: StreamOutcome) -> Self {
        let (_tx, rx) = mpsc::channel(1);
        Self {
            rx,
            cancel: CancellationToken::new(),
            outcome: Some(outcome),
        }
    }

    /// Next record, `None` once the stream has ended
    ///
    /// A failure is yielded once as `Some(Err(_))`; the following call
    /// returns `None`.
    pub async fn next(&mut self) -> Option<Result<ListEntry>> {
        if self.outcome.is_some() {
            return None;
        }
        if self.cancel.is_cancelled() {
            self.outcome = Some(StreamOutcome::Cancelled);
            return None;
        }

        let frame = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                self.outcome = Some(StreamOutcome::Cancelled);
                return None;
            }
            frame = self.rx.recv() => frame,
        };

        match frame {
            Some(Frame::Entry(entry)) => Some(Ok(entry)),
            Some(Frame::Done) => {
                self.outcome = Some(StreamOutcome::Completed);
                None
            }
            Some(Frame::Failed(error)) => {
                self.outcome = Some(StreamOutcome::Failed);
                Some(Err(error))
            }
            None => {
                // Producer dropped its sender without reporting an outcome
                self.outcome = Some(StreamOutcome::Failed);
                Some(Err(Error::General(
                    "listing stopped before the end of the stream".into(),
                )))
            }
        }
    }

    /// Stop the listing; the producer closes the connection
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Terminal state, `None` while the stream is live
    pub fn outcome(&self) -> Option<StreamOutcome> {
        self.outcome
    }

    /// Adapt into a `futures::Stream`
    pub fn into_stream(self) -> impl Stream<Item = Result<ListEntry>> + Send {
        futures::stream::unfold(self, |mut stream| async move {
            stream.next().await.map(|item| (item, stream))
        })
    }
}

impl Drop for ListStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

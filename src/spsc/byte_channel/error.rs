use std::io;

use thiserror::Error;

/// Failures surfaced by [`ByteChannel`](super::ByteChannel) operations.
///
/// Reaching the end of the stream is not a failure and is reported through
/// [`Received::EndOfData`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The consumer read an empty channel it had already closed locally.
    #[error("stream closed")]
    StreamClosed,
    /// The producer wrote to a channel the consumer has closed.
    #[error("connection closed")]
    ConnectionClosed,
    /// The producer wrote after declaring its own end of stream.
    #[error("receiver closed")]
    ReceiverClosed,
    /// A blocking wait was cancelled through an [`Interrupter`](super::Interrupter).
    #[error("blocking wait interrupted")]
    Interrupted,
    /// Bulk read arguments do not fit the destination buffer.
    #[error("range {offset}..{offset}+{len} out of bounds for buffer of length {buf_len}")]
    IndexOutOfRange {
        offset: usize,
        len: usize,
        buf_len: usize,
    },
    /// Channels must hold at least one byte.
    #[error("invalid channel capacity {0}, must be at least 1")]
    InvalidCapacity(usize),
    /// The liveness wait interval must be non-zero.
    #[error("wait interval must be non-zero")]
    InvalidWaitInterval,
}

impl ChannelError {
    /// Returns `true` for the close-driven errors. The side that observes one
    /// of these should stop using the channel.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ChannelError::StreamClosed
                | ChannelError::ConnectionClosed
                | ChannelError::ReceiverClosed
        )
    }

    /// Returns `true` when retrying the same call can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChannelError::Interrupted)
    }
}

impl From<ChannelError> for io::Error {
    fn from(err: ChannelError) -> Self {
        let kind = match err {
            ChannelError::StreamClosed
            | ChannelError::ConnectionClosed
            | ChannelError::ReceiverClosed => io::ErrorKind::BrokenPipe,
            ChannelError::Interrupted => io::ErrorKind::Interrupted,
            ChannelError::IndexOutOfRange { .. }
            | ChannelError::InvalidCapacity(_)
            | ChannelError::InvalidWaitInterval => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, err)
    }
}

/// Outcome of a successful read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received<T> {
    /// Data was read.
    Data(T),
    /// The producer closed and every buffered byte has been consumed.
    EndOfData,
}

impl<T> Received<T> {
    /// Returns the data, or `None` at end of data.
    pub fn data(self) -> Option<T> {
        match self {
            Received::Data(value) => Some(value),
            Received::EndOfData => None,
        }
    }

    pub fn is_end_of_data(&self) -> bool {
        matches!(self, Received::EndOfData)
    }
}

//! Blocking, bounded, single-producer single-consumer byte channel.
//!
//! # Overview
//! A [`ByteChannel`] stands in for one direction of a connection: the
//! producer deposits bytes as if they arrived from the network and the
//! consumer reads them like a socket input stream. The buffer never grows.
//! A producer facing a full buffer blocks until the consumer frees space,
//! and a consumer facing an empty buffer blocks until data arrives or the
//! stream ends.
//!
//! [`ByteChannel::split`] hands out a [`Producer`] and a [`Consumer`] that
//! each expose only their side's operations. The [`ByteChannel`] handle
//! itself exposes both and suits an owner that wires the two roles itself.
//!
//! # Example
//! ```
//! use bounded_byte_channel::{ByteChannel, Received};
//!
//! let (producer, consumer) = ByteChannel::split(4);
//!
//! producer.write_all(b"hi").unwrap();
//! producer.peer_close();
//!
//! assert_eq!(consumer.read_one().unwrap(), Received::Data(b'h'));
//! assert_eq!(consumer.read_one().unwrap(), Received::Data(b'i'));
//! assert_eq!(consumer.read_one().unwrap(), Received::EndOfData);
//! ```
//!
//! # Closing
//! [`local_close`](ByteChannel::local_close) means the consumer gives up:
//! every pending or future write fails with
//! [`ChannelError::ConnectionClosed`]. Bytes already buffered can still be
//! read. Once the buffer is empty reads fail with
//! [`ChannelError::StreamClosed`].
//!
//! [`peer_close`](ByteChannel::peer_close) means the producer is done.
//! Buffered bytes drain normally and the consumer then sees
//! [`Received::EndOfData`]. Any further write fails with
//! [`ChannelError::ReceiverClosed`].
//!
//! Dropping a [`Consumer`] closes locally; dropping a [`Producer`] closes the
//! peer side.

use std::io;
use std::sync::Arc;

use super::inner::Shared;
use super::{ChannelConfig, ChannelError, CloseState, Interrupter, Received, Side};

/// Shared handle to a bounded byte channel.
///
/// Clones refer to the same channel. The channel supports exactly one
/// producer thread and one consumer thread at a time.
#[derive(Clone, Debug)]
pub struct ByteChannel {
    shared: Arc<Shared>,
}

impl ByteChannel {
    /// Creates a channel holding up to `capacity` bytes, with the default
    /// wait interval.
    ///
    /// # Panics
    /// Panics if `capacity` is 0. Use [`with_config`](Self::with_config) to
    /// get an error instead.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "channel capacity must be non-zero");
        let config = ChannelConfig::default();
        Self {
            shared: Arc::new(Shared::new(capacity, config.wait_interval)),
        }
    }

    pub fn with_config(config: ChannelConfig) -> Result<Self, ChannelError> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared::new(config.capacity, config.wait_interval)),
        })
    }

    /// Creates a channel and splits it into its producing and consuming
    /// halves.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn split(capacity: usize) -> (Producer, Consumer) {
        Self::new(capacity).into_split()
    }

    /// Splits this channel into its two halves.
    pub fn into_split(self) -> (Producer, Consumer) {
        let producer = Producer {
            channel: self.clone(),
        };
        let consumer = Consumer { channel: self };
        (producer, consumer)
    }

    /// Reads one byte, blocking while the channel is empty.
    ///
    /// Returns [`Received::EndOfData`] once the producer has closed and
    /// nothing is left.
    ///
    /// # Errors
    /// - [`ChannelError::StreamClosed`] if the channel is empty and closed
    ///   locally.
    /// - [`ChannelError::Interrupted`] if the consumer side was interrupted
    ///   while waiting.
    pub fn read_one(&self) -> Result<Received<u8>, ChannelError> {
        self.shared.read_one()
    }

    /// Reads up to `max_len` bytes into `buf[offset..offset + max_len]`.
    ///
    /// Blocks only until the first byte is available, then returns whatever
    /// else is already buffered. Returns the number of bytes copied, which is
    /// at least 1 unless `max_len` is 0.
    ///
    /// # Errors
    /// - [`ChannelError::IndexOutOfRange`] if the range does not fit `buf`.
    ///   Checked before anything else.
    /// - [`ChannelError::StreamClosed`] / [`ChannelError::Interrupted`] as
    ///   for [`read_one`](Self::read_one).
    pub fn read_into(
        &self,
        buf: &mut [u8],
        offset: usize,
        max_len: usize,
    ) -> Result<Received<usize>, ChannelError> {
        self.shared.read_into(buf, offset, max_len)
    }

    /// Deposits one byte, blocking while the channel is full.
    ///
    /// # Errors
    /// - [`ChannelError::ConnectionClosed`] if the consumer closed, even if
    ///   space is free.
    /// - [`ChannelError::ReceiverClosed`] if the producer side already
    ///   closed.
    /// - [`ChannelError::Interrupted`] if the producer side was interrupted
    ///   while waiting.
    pub fn write_one(&self, byte: u8) -> Result<(), ChannelError> {
        self.shared.write_one(byte)
    }

    /// Deposits all of `data` in order, blocking whenever the channel fills.
    ///
    /// On error, the bytes deposited before the failure stay in the channel.
    /// An empty `data` never blocks but still fails on a closed channel.
    pub fn write_all(&self, mut data: &[u8]) -> Result<(), ChannelError> {
        if data.is_empty() {
            return self.shared.check_writable();
        }
        while !data.is_empty() {
            let written = self.shared.write_some(data)?;
            data = &data[written..];
        }
        Ok(())
    }

    /// Number of unread bytes. Only a snapshot under concurrent use.
    pub fn available(&self) -> usize {
        self.shared.available()
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    /// Declares that the consumer reads no more. Idempotent, never blocks.
    pub fn local_close(&self) {
        self.shared.local_close();
    }

    /// Declares that the producer deposits no more. Idempotent, never blocks.
    pub fn peer_close(&self) {
        self.shared.peer_close();
    }

    pub fn is_local_closed(&self) -> bool {
        self.shared.close_state().is_local_closed()
    }

    pub fn is_peer_closed(&self) -> bool {
        self.shared.close_state().is_peer_closed()
    }

    pub fn state(&self) -> CloseState {
        self.shared.close_state()
    }

    /// Returns `true` once both sides are closed and nothing is buffered.
    /// Such a channel carries no further information.
    pub fn is_terminated(&self) -> bool {
        self.shared.is_terminated()
    }

    /// Returns a handle that cancels blocking waits of `side`.
    pub fn interrupter(&self, side: Side) -> Interrupter {
        Interrupter::new(Arc::clone(&self.shared), side)
    }
}

/// The depositing half of a [`ByteChannel`].
///
/// Not cloneable: a channel has a single producer. Dropping it closes the
/// peer side, which lets the consumer drain and then see end of data.
#[derive(Debug)]
pub struct Producer {
    channel: ByteChannel,
}

impl Producer {
    /// See [`ByteChannel::write_one`].
    #[inline]
    pub fn write_one(&self, byte: u8) -> Result<(), ChannelError> {
        self.channel.write_one(byte)
    }

    /// See [`ByteChannel::write_all`].
    #[inline]
    pub fn write_all(&self, data: &[u8]) -> Result<(), ChannelError> {
        self.channel.write_all(data)
    }

    /// Ends the stream. See [`ByteChannel::peer_close`].
    #[inline]
    pub fn peer_close(&self) {
        self.channel.peer_close();
    }

    #[inline]
    pub fn is_local_closed(&self) -> bool {
        self.channel.is_local_closed()
    }

    #[inline]
    pub fn is_peer_closed(&self) -> bool {
        self.channel.is_peer_closed()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.channel.capacity()
    }

    /// Returns a handle that cancels this producer's blocking writes.
    pub fn interrupter(&self) -> Interrupter {
        self.channel.interrupter(Side::Producer)
    }
}

impl Drop for Producer {
    fn drop(&mut self) {
        self.channel.peer_close();
    }
}

/// Writes block for space to deposit at least one byte and return how many
/// bytes fit. Channel errors convert to [`io::Error`].
impl io::Write for Producer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            self.channel.shared.check_writable()?;
            return Ok(0);
        }
        Ok(self.channel.shared.write_some(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// The reading half of a [`ByteChannel`].
///
/// Not cloneable: a channel has a single consumer. Dropping it closes the
/// channel locally, which fails the producer's pending and future writes.
#[derive(Debug)]
pub struct Consumer {
    channel: ByteChannel,
}

impl Consumer {
    /// See [`ByteChannel::read_one`].
    #[inline]
    pub fn read_one(&self) -> Result<Received<u8>, ChannelError> {
        self.channel.read_one()
    }

    /// See [`ByteChannel::read_into`].
    #[inline]
    pub fn read_into(
        &self,
        buf: &mut [u8],
        offset: usize,
        max_len: usize,
    ) -> Result<Received<usize>, ChannelError> {
        self.channel.read_into(buf, offset, max_len)
    }

    #[inline]
    pub fn available(&self) -> usize {
        self.channel.available()
    }

    /// Stops reading. See [`ByteChannel::local_close`].
    #[inline]
    pub fn local_close(&self) {
        self.channel.local_close();
    }

    #[inline]
    pub fn is_local_closed(&self) -> bool {
        self.channel.is_local_closed()
    }

    #[inline]
    pub fn is_peer_closed(&self) -> bool {
        self.channel.is_peer_closed()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.channel.capacity()
    }

    /// Returns a handle that cancels this consumer's blocking reads.
    pub fn interrupter(&self) -> Interrupter {
        self.channel.interrupter(Side::Consumer)
    }
}

impl Drop for Consumer {
    fn drop(&mut self) {
        self.channel.local_close();
    }
}

/// End of data reads as `Ok(0)`. An interrupted read surfaces as
/// [`io::ErrorKind::Interrupted`], which helpers such as
/// [`io::Read::read_to_end`] retry on their own.
impl io::Read for Consumer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len();
        match self.channel.read_into(buf, 0, len)? {
            Received::Data(count) => Ok(count),
            Received::EndOfData => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::thread;

    use super::*;

    #[test]
    fn split_halves_share_one_buffer() {
        let (producer, consumer) = ByteChannel::split(8);
        producer.write_all(b"abc").unwrap();
        assert_eq!(consumer.available(), 3);
        assert_eq!(producer.capacity(), 8);
        assert_eq!(consumer.read_one().unwrap(), Received::Data(b'a'));
    }

    #[test]
    fn dropping_producer_ends_stream_after_drain() {
        let (producer, consumer) = ByteChannel::split(4);
        producer.write_one(1).unwrap();
        drop(producer);

        assert!(consumer.is_peer_closed());
        assert_eq!(consumer.read_one().unwrap(), Received::Data(1));
        assert_eq!(consumer.read_one().unwrap(), Received::EndOfData);
    }

    #[test]
    fn dropping_consumer_fails_producer() {
        let (producer, consumer) = ByteChannel::split(4);
        drop(consumer);

        assert!(producer.is_local_closed());
        assert_eq!(producer.write_one(1), Err(ChannelError::ConnectionClosed));
    }

    #[test]
    fn write_all_blocks_until_consumer_catches_up() {
        let (producer, mut consumer) = ByteChannel::split(3);
        let payload: Vec<u8> = (0..=255).collect();
        let expected = payload.clone();

        let writer = thread::spawn(move || {
            producer.write_all(&payload).unwrap();
        });

        let mut received = Vec::new();
        consumer.read_to_end(&mut received).unwrap();
        writer.join().unwrap();
        assert_eq!(received, expected);
    }

    #[test]
    fn io_write_reports_partial_deposit() {
        let (mut producer, consumer) = ByteChannel::split(2);
        assert_eq!(producer.write(b"xyz").unwrap(), 2);
        assert_eq!(producer.write(b"").unwrap(), 0);
        producer.flush().unwrap();
        assert_eq!(consumer.available(), 2);
    }

    #[test]
    fn empty_writes_report_closes() {
        let (mut producer, consumer) = ByteChannel::split(1);
        producer.write_one(1).unwrap();
        // A full but open channel accepts an empty write without blocking.
        producer.write_all(&[]).unwrap();
        assert_eq!(producer.write(&[]).unwrap(), 0);

        consumer.local_close();
        assert_eq!(producer.write_all(&[]), Err(ChannelError::ConnectionClosed));
        let err = producer.write(&[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn empty_write_after_peer_close_fails() {
        let channel = ByteChannel::new(2);
        channel.peer_close();
        assert_eq!(channel.write_all(b""), Err(ChannelError::ReceiverClosed));
    }

    #[test]
    fn io_read_maps_errors() {
        let (producer, mut consumer) = ByteChannel::split(2);
        consumer.local_close();
        let mut buf = [0u8; 4];
        let err = consumer.read(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        drop(producer);
    }

    #[test]
    fn with_config_rejects_zero_capacity() {
        let err = ByteChannel::with_config(ChannelConfig::default().with_capacity(0)).unwrap_err();
        assert_eq!(err, ChannelError::InvalidCapacity(0));
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn new_panics_on_zero_capacity() {
        let _ = ByteChannel::new(0);
    }

    #[test]
    fn clones_observe_the_same_state() {
        let channel = ByteChannel::new(2);
        let other = channel.clone();
        channel.write_one(9).unwrap();
        other.peer_close();
        assert_eq!(channel.state(), CloseState::PeerClosed);
        assert_eq!(other.read_one().unwrap(), Received::Data(9));
        channel.local_close();
        assert!(other.is_terminated());
    }
}

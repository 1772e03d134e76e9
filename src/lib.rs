//! Bounded, blocking, single-producer single-consumer byte channel.
//!
//! The channel emulates one direction of a duplex connection endpoint: a
//! producer deposits inbound bytes, a consumer reads them back out in FIFO
//! order. Capacity is fixed, a full buffer blocks the producer, and the two
//! sides close independently.
//!
//! See [`spsc::byte_channel`] for the details.

pub mod spsc;

pub use spsc::byte_channel::{
    ByteChannel, ChannelConfig, ChannelError, CloseState, Consumer, Interrupter, Producer,
    Received, Side,
};

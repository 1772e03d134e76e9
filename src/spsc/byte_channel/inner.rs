use std::time::Duration;

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, trace};

use super::{ChannelError, CloseState, Received, Side};

/// Fixed-size circular byte store.
///
/// # Wrap-around logic
///
/// `write` and `read` cycle through `0..capacity`. Instead of `% capacity`
/// the advanced index is reduced by `capacity` times the boolean
/// `(next >= capacity)`, which wraps it back into range. A cursor never moves
/// by more than `capacity`, so one subtraction is always enough:
///
/// ```text
/// let next = index + by;
/// let next = next - capacity * (next >= capacity) as usize;
/// ```
///
/// Unlike a lock-free ring, no slot is kept empty to tell full from empty:
/// `available` is tracked explicitly, so all `capacity` bytes are usable.
#[derive(Debug)]
pub(crate) struct Ring {
    storage: Box<[u8]>,
    /// Slot the next deposited byte goes to.
    write: usize,
    /// Slot the next consumed byte comes from.
    read: usize,
    available: usize,
}

impl Ring {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            storage: vec![0; capacity].into_boxed_slice(),
            write: 0,
            read: 0,
            available: 0,
        }
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[inline(always)]
    pub(crate) fn available(&self) -> usize {
        self.available
    }

    #[inline(always)]
    pub(crate) fn is_empty(&self) -> bool {
        self.available == 0
    }

    #[inline(always)]
    pub(crate) fn is_full(&self) -> bool {
        self.available == self.capacity()
    }

    #[inline(always)]
    fn advance(&self, index: usize, by: usize) -> usize {
        let next = index + by;
        next - self.capacity() * (next >= self.capacity()) as usize
    }

    /// Stores one byte. The caller must have checked `!is_full()`.
    pub(crate) fn deposit_byte(&mut self, byte: u8) {
        debug_assert!(!self.is_full());
        self.storage[self.write] = byte;
        self.write = self.advance(self.write, 1);
        self.available += 1;
    }

    /// Removes the oldest byte. The caller must have checked `!is_empty()`.
    pub(crate) fn consume_byte(&mut self) -> u8 {
        debug_assert!(!self.is_empty());
        let byte = self.storage[self.read];
        self.read = self.advance(self.read, 1);
        self.available -= 1;
        byte
    }

    /// Copies as many bytes of `src` as there is free space for and returns
    /// how many were stored.
    pub(crate) fn deposit_from(&mut self, src: &[u8]) -> usize {
        let count = src.len().min(self.capacity() - self.available);
        // Free space may wrap: fill up to the end of storage, then from 0.
        let first = count.min(self.capacity() - self.write);
        self.storage[self.write..self.write + first].copy_from_slice(&src[..first]);
        self.storage[..count - first].copy_from_slice(&src[first..count]);
        self.write = self.advance(self.write, count);
        self.available += count;
        count
    }

    /// Moves up to `dst.len()` of the oldest bytes into `dst` and returns how
    /// many were moved.
    pub(crate) fn consume_into(&mut self, dst: &mut [u8]) -> usize {
        let count = dst.len().min(self.available);
        let first = count.min(self.capacity() - self.read);
        dst[..first].copy_from_slice(&self.storage[self.read..self.read + first]);
        dst[first..count].copy_from_slice(&self.storage[..count - first]);
        self.read = self.advance(self.read, count);
        self.available -= count;
        count
    }
}

/// Everything guarded by the channel lock.
#[derive(Debug)]
struct State {
    ring: Ring,
    close: CloseState,
    /// Pending interrupt per side, indexed by `Side as usize`.
    interrupted: [bool; 2],
}

impl State {
    fn take_interrupt(&mut self, side: Side) -> bool {
        std::mem::take(&mut self.interrupted[side as usize])
    }
}

/// State shared by every handle of one channel.
///
/// A single mutex serializes all transitions. One condition variable serves
/// both sides; every mutation wakes all waiters because either side's exit
/// condition can depend on the other's action.
#[derive(Debug)]
pub(crate) struct Shared {
    state: Mutex<State>,
    changed: Condvar,
    capacity: usize,
    wait_interval: Duration,
}

impl Shared {
    pub(crate) fn new(capacity: usize, wait_interval: Duration) -> Self {
        Self {
            state: Mutex::new(State {
                ring: Ring::new(capacity),
                close: CloseState::Open,
                interrupted: [false; 2],
            }),
            changed: Condvar::new(),
            capacity,
            wait_interval,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn available(&self) -> usize {
        self.state.lock().ring.available()
    }

    pub(crate) fn close_state(&self) -> CloseState {
        self.state.lock().close
    }

    pub(crate) fn is_terminated(&self) -> bool {
        let state = self.state.lock();
        state.close == CloseState::BothClosed && state.ring.is_empty()
    }

    pub(crate) fn read_one(&self) -> Result<Received<u8>, ChannelError> {
        let mut state = self.state.lock();
        if !self.await_data(&mut state)? {
            return Ok(Received::EndOfData);
        }
        let byte = state.ring.consume_byte();
        self.changed.notify_all();
        Ok(Received::Data(byte))
    }

    /// Blocks for the first byte only, then takes whatever else is buffered,
    /// up to `max_len`.
    pub(crate) fn read_into(
        &self,
        buf: &mut [u8],
        offset: usize,
        max_len: usize,
    ) -> Result<Received<usize>, ChannelError> {
        let end = offset
            .checked_add(max_len)
            .filter(|end| *end <= buf.len())
            .ok_or(ChannelError::IndexOutOfRange {
                offset,
                len: max_len,
                buf_len: buf.len(),
            })?;

        let mut state = self.state.lock();
        if max_len == 0 {
            if state.close.is_local_closed() && state.ring.is_empty() {
                return Err(ChannelError::StreamClosed);
            }
            return Ok(Received::Data(0));
        }
        if !self.await_data(&mut state)? {
            return Ok(Received::EndOfData);
        }
        let count = state.ring.consume_into(&mut buf[offset..end]);
        self.changed.notify_all();
        Ok(Received::Data(count))
    }

    pub(crate) fn write_one(&self, byte: u8) -> Result<(), ChannelError> {
        let mut state = self.state.lock();
        self.await_space(&mut state)?;
        state.ring.deposit_byte(byte);
        self.changed.notify_all();
        Ok(())
    }

    /// Blocks until at least one byte of `data` fits, then deposits as many
    /// as the free space allows. Returns the number deposited.
    pub(crate) fn write_some(&self, data: &[u8]) -> Result<usize, ChannelError> {
        let mut state = self.state.lock();
        self.await_space(&mut state)?;
        let count = state.ring.deposit_from(data);
        self.changed.notify_all();
        Ok(count)
    }

    /// Fails like a write would if the channel is closed, without waiting
    /// for space.
    pub(crate) fn check_writable(&self) -> Result<(), ChannelError> {
        write_error(self.state.lock().close).map_or(Ok(()), Err)
    }

    pub(crate) fn local_close(&self) {
        let mut state = self.state.lock();
        let next = state.close.local_close();
        if next != state.close {
            debug!(state = ?next, buffered = state.ring.available(), "channel closed locally");
            state.close = next;
        }
        self.changed.notify_all();
    }

    pub(crate) fn peer_close(&self) {
        let mut state = self.state.lock();
        let next = state.close.peer_close();
        if next != state.close {
            debug!(state = ?next, buffered = state.ring.available(), "channel closed by peer");
            state.close = next;
        }
        self.changed.notify_all();
    }

    /// Arms the interrupt flag of `side`. Returns `false` if it was already
    /// armed.
    pub(crate) fn interrupt(&self, side: Side) -> bool {
        let mut state = self.state.lock();
        let newly = !std::mem::replace(&mut state.interrupted[side as usize], true);
        self.changed.notify_all();
        newly
    }

    /// Returns `Ok(true)` once a byte is buffered and `Ok(false)` at end of
    /// data.
    fn await_data(&self, state: &mut MutexGuard<'_, State>) -> Result<bool, ChannelError> {
        loop {
            if !state.ring.is_empty() {
                return Ok(true);
            }
            if state.close.is_local_closed() {
                return Err(ChannelError::StreamClosed);
            }
            if state.close.is_peer_closed() {
                return Ok(false);
            }
            self.wait(state, Side::Consumer)?;
        }
    }

    /// Close checks come first: a closed channel rejects writes even when
    /// space is free.
    fn await_space(&self, state: &mut MutexGuard<'_, State>) -> Result<(), ChannelError> {
        loop {
            if let Some(err) = write_error(state.close) {
                return Err(err);
            }
            if !state.ring.is_full() {
                return Ok(());
            }
            self.wait(state, Side::Producer)?;
        }
    }

    /// One wait cycle. The lock is released while waiting. A timeout is not
    /// an error; the caller simply re-checks.
    fn wait(&self, state: &mut MutexGuard<'_, State>, side: Side) -> Result<(), ChannelError> {
        if state.take_interrupt(side) {
            debug!(?side, "blocking wait interrupted");
            return Err(ChannelError::Interrupted);
        }
        trace!(
            ?side,
            available = state.ring.available(),
            capacity = state.ring.capacity(),
            "waiting on channel"
        );
        if self.changed.wait_for(state, self.wait_interval).timed_out() {
            trace!(?side, "wait interval elapsed");
        }
        Ok(())
    }
}

/// A local close is reported before a peer close.
fn write_error(close: CloseState) -> Option<ChannelError> {
    if close.is_local_closed() {
        Some(ChannelError::ConnectionClosed)
    } else if close.is_peer_closed() {
        Some(ChannelError::ReceiverClosed)
    } else {
        None
    }
}

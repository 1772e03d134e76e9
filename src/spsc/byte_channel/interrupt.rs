use std::sync::Arc;

use super::inner::Shared;

/// The two roles of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Deposits bytes.
    Producer = 0,
    /// Reads bytes.
    Consumer = 1,
}

/// Cancels blocking waits on one side of a channel from another thread.
///
/// [`interrupt`](Interrupter::interrupt) arms the side's interrupt flag and
/// wakes every waiter. The next wait cycle on that side consumes the flag
/// and fails with [`ChannelError::Interrupted`](super::ChannelError::Interrupted).
/// An operation that completes without waiting leaves the flag armed.
#[derive(Clone, Debug)]
pub struct Interrupter {
    shared: Arc<Shared>,
    side: Side,
}

impl Interrupter {
    pub(crate) fn new(shared: Arc<Shared>, side: Side) -> Self {
        Self { shared, side }
    }

    /// Returns `true` if this call armed the flag, `false` if an earlier
    /// interrupt is still pending.
    pub fn interrupt(&self) -> bool {
        self.shared.interrupt(self.side)
    }

    pub fn side(&self) -> Side {
        self.side
    }
}

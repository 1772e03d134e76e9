use std::time::Duration;

use super::ChannelError;

/// Default buffer size in bytes.
pub const DEFAULT_CAPACITY: usize = 8 * 1024;

/// Default upper bound on a single blocking wait before the waiter re-checks
/// its exit conditions.
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_secs(1);

/// Construction options for a [`ByteChannel`](super::ByteChannel).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Number of bytes the channel can hold. Must be at least 1.
    pub capacity: usize,
    /// Timeout of each wait cycle while blocked. Expiry never fails an
    /// operation, it only forces another check of the channel state.
    pub wait_interval: Duration,
}

impl ChannelConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_wait_interval(mut self, wait_interval: Duration) -> Self {
        self.wait_interval = wait_interval;
        self
    }

    /// Checks that the options describe a usable channel.
    pub fn validate(&self) -> Result<(), ChannelError> {
        if self.capacity == 0 {
            return Err(ChannelError::InvalidCapacity(self.capacity));
        }
        if self.wait_interval.is_zero() {
            return Err(ChannelError::InvalidWaitInterval);
        }
        Ok(())
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            wait_interval: DEFAULT_WAIT_INTERVAL,
        }
    }
}

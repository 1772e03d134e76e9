mod channel;
mod config;
mod error;
mod inner;
mod interrupt;
mod state;

pub use channel::{ByteChannel, Consumer, Producer};
pub use config::{ChannelConfig, DEFAULT_CAPACITY, DEFAULT_WAIT_INTERVAL};
pub use error::{ChannelError, Received};
pub use interrupt::{Interrupter, Side};
pub use state::CloseState;

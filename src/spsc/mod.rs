/// Blocking bounded byte channel with half-close semantics.
pub mod byte_channel;

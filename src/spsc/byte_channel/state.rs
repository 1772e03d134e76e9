/// Close state of a channel.
///
/// Each side closes independently and neither close can be undone:
///
/// ```text
///            local_close            peer_close
///   Open ─────────────────▶ LocalClosed ─────────▶ BothClosed
///     │                                               ▲
///     └──────────────────▶ PeerClosed ────────────────┘
///            peer_close             local_close
/// ```
///
/// A local close is fatal to the producer. A peer close only ends the stream
/// once the consumer has drained what is buffered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloseState {
    #[default]
    Open,
    /// The consumer will read no more.
    LocalClosed,
    /// The producer will deposit no more.
    PeerClosed,
    BothClosed,
}

impl CloseState {
    /// Applies a consumer-side close. Idempotent.
    #[must_use]
    pub fn local_close(self) -> Self {
        match self {
            CloseState::Open | CloseState::LocalClosed => CloseState::LocalClosed,
            CloseState::PeerClosed | CloseState::BothClosed => CloseState::BothClosed,
        }
    }

    /// Applies a producer-side close. Idempotent.
    #[must_use]
    pub fn peer_close(self) -> Self {
        match self {
            CloseState::Open | CloseState::PeerClosed => CloseState::PeerClosed,
            CloseState::LocalClosed | CloseState::BothClosed => CloseState::BothClosed,
        }
    }

    #[inline]
    pub fn is_local_closed(self) -> bool {
        matches!(self, CloseState::LocalClosed | CloseState::BothClosed)
    }

    #[inline]
    pub fn is_peer_closed(self) -> bool {
        matches!(self, CloseState::PeerClosed | CloseState::BothClosed)
    }
}

//! The wire format: each message is a single datagram whose entire payload is
//!  one of two fixed ASCII tokens. No header, no length prefix, no sequence
//!  number, no checksum beyond what UDP provides.

/// the liveness request payload
pub const PROBE: &[u8] = b"PING";

/// the liveness response payload
pub const ACKNOWLEDGMENT: &[u8] = b"PONG";

/// Receive buffer size for both sides. Vastly more than either token needs.
pub const MAX_DATAGRAM_SIZE: usize = 1024;


/// One send/receive cycle of the prober, bounded by its own timeout.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Attempt {
    /// 1-based attempt index
    pub index: usize,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AttemptOutcome {
    /// A datagram arrived within the attempt's timeout window. The payload is
    ///  surfaced as received - it is not required to equal [ACKNOWLEDGMENT]
    ///  (see [crate::prober::Prober::run] for the leniency rules).
    Acknowledged { payload: Vec<u8> },
    TimedOut,
}

impl AttemptOutcome {
    pub fn is_acknowledged(&self) -> bool {
        matches!(self, AttemptOutcome::Acknowledged { .. })
    }
}

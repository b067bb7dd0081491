//! The downstream consumer contract.
//!
//! The egress worker hands released packets to whatever sits downstream
//! through this trait. A downstream failure becomes `src_result` on the
//! coordinator and is surfaced to every subsequent caller until a
//! flush-stop recovers the element, mirroring how a GStreamer element
//! latches its source pad's last flow return.

use crate::packet::Packet;

/// Outcome of handing a packet (or EOS) downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowResult {
    Ok,
    Error(String),
}

/// Out-of-band notifications propagated to the downstream consumer,
/// distinct from packet data: a new segment, a flush starting or
/// stopping, and end-of-stream being queued. These travel immediately, on
/// the thread that received them, rather than through the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Segment { rate: f64, start_ns: u64, time_ns: u64 },
    FlushStart,
    Eos,
}

/// Receives packets and EOS notifications released by the egress worker.
pub trait Downstream: Send + Sync {
    /// `discontinuous` is set when this release follows a gap in
    /// `next_expected_seq` (one or more packets were never recovered),
    /// mirroring a buffer's discontinuity flag.
    fn push(&self, packet: Packet, discontinuous: bool) -> FlowResult;
    fn push_eos(&self) -> FlowResult;
    /// Propagate a control event (segment, flush-start, EOS-queued).
    fn push_event(&self, event: Event) -> FlowResult;
}

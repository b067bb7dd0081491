//! Test-only support code for the scenario suite: a recording downstream
//! sink and a small helper for polling the fake clock's effect without a
//! real sleep-and-hope race.

use parking_lot::Mutex;
use rtp_jbuf::clock::FakeClock;
use rtp_jbuf::packet::Packet;
use rtp_jbuf::sink::{Downstream, Event, FlowResult};
use std::time::{Duration, Instant};

/// Records every packet (and whether it arrived flagged discontinuous),
/// every EOS handed to it, and every out-of-band event, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    received: Mutex<Vec<Release>>,
}

#[derive(Debug, Clone)]
pub enum Release {
    Packet { seq: u16, discontinuous: bool },
    Eos,
    Event(Event),
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn releases(&self) -> Vec<Release> {
        self.received.lock().clone()
    }

    pub fn seqs(&self) -> Vec<u16> {
        self.received
            .lock()
            .iter()
            .filter_map(|r| match r {
                Release::Packet { seq, .. } => Some(*seq),
                _ => None,
            })
            .collect()
    }

    pub fn discontinuous_seqs(&self) -> Vec<u16> {
        self.received
            .lock()
            .iter()
            .filter_map(|r| match r {
                Release::Packet { seq, discontinuous: true } => Some(*seq),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.received.lock().len()
    }
}

impl Downstream for RecordingSink {
    fn push(&self, packet: Packet, discontinuous: bool) -> FlowResult {
        self.received.lock().push(Release::Packet { seq: packet.seq, discontinuous });
        FlowResult::Ok
    }

    fn push_eos(&self) -> FlowResult {
        self.received.lock().push(Release::Eos);
        FlowResult::Ok
    }

    fn push_event(&self, event: Event) -> FlowResult {
        self.received.lock().push(Release::Event(event));
        FlowResult::Ok
    }
}

/// Advance `clock` by `delta_ns` and poll `sink` until it has released at
/// least `expected_len` items or a generous real-time timeout elapses.
/// The fake clock makes *when* a release becomes due deterministic; this
/// only bounds how long we wait for the worker thread to notice.
pub fn advance_and_wait(clock: &FakeClock, delta_ns: u64, sink: &RecordingSink, expected_len: usize) {
    clock.advance(delta_ns);
    let deadline = Instant::now() + Duration::from_secs(2);
    while sink.len() < expected_len && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
}

//! Buffer coordinator: the store, the release scheduler, and the
//! ingress/egress handshake bound together behind a single lock.
//!
//! Grounded on the teacher crate's `engine::wake` dual-path wake pattern
//! and the original jitter buffer's `JBUF_LOCK`/`JBUF_WAIT`/`JBUF_SIGNAL`
//! macros: one mutex guards every mutable field, and the only place that
//! ever releases it mid-operation is the egress worker's deadline wait.
//! Every other state change — insert, flush, EOS, a downstream failure —
//! happens atomically under the lock and then notifies the condvar so the
//! worker re-evaluates from scratch.

use crate::clock::{Clock, SystemClock, WaitOutcome};
use crate::config::Config;
use crate::control::{Lifecycle, State};
use crate::error::{Error, Result};
use crate::format::FormatResolver;
use crate::packet::Packet;
use crate::rtp;
use crate::scheduler::{ts_offset_to_rtp_ticks, SchedulerState};
use crate::segment::{Segment, TimeFormat};
use crate::seq::{seq_diff, seq_next};
use crate::sink::{Downstream, Event, FlowResult};
use crate::store::PacketStore;

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Latched flow state, mirroring a source pad's last flow return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SrcResult {
    Ok,
    Flushing,
    EosReached,
    PausedError(String),
}

#[derive(Debug, Clone, Copy)]
struct ActiveDeadline {
    waiting_seq: u16,
    deadline_ns: u64,
}

struct Shared {
    store: PacketStore,
    cfg: Config,
    scheduler: SchedulerState,
    segment: Segment,
    clock_rate_hz: Option<u32>,
    current_pt: Option<u8>,
    last_popped_seq: Option<u16>,
    next_expected_seq: Option<u16>,
    src_result: SrcResult,
    /// Set alongside `src_result = PausedError(_)`; lets the worker stop
    /// releasing without re-deriving "blocked" from the error each time.
    /// Also toggled directly by lifecycle transitions (paused/playing).
    blocked: bool,
    shutdown: bool,
    /// End-of-stream has been requested but not yet drained: kept as a
    /// plain flag rather than a store sentinel so it can only be acted on
    /// once every resident packet has actually been released.
    eos_queued: bool,
    active_deadline: Option<ActiveDeadline>,
    peer_latency_ns: u64,
    /// The `ts_offset_ns` in effect at the last release, so a change is
    /// detected and flagged as a discontinuity on the next one.
    prev_ts_offset_ns: i64,
    live: bool,
    late_count: u64,
    duplicate_count: u64,
}

impl Shared {
    fn new(cfg: Config) -> Self {
        let prev_ts_offset_ns = cfg.ts_offset_ns;
        Self {
            store: PacketStore::new(),
            cfg,
            scheduler: SchedulerState::new(),
            segment: Segment::default(),
            clock_rate_hz: None,
            current_pt: None,
            last_popped_seq: None,
            next_expected_seq: None,
            src_result: SrcResult::Ok,
            blocked: false,
            shutdown: false,
            eos_queued: false,
            active_deadline: None,
            peer_latency_ns: 0,
            prev_ts_offset_ns,
            live: false,
            late_count: 0,
            duplicate_count: 0,
        }
    }

    fn check_pushable(&self) -> Result<()> {
        match &self.src_result {
            SrcResult::Flushing => Err(Error::Flushing),
            SrcResult::EosReached => Err(Error::Eos),
            SrcResult::PausedError(msg) => Err(Error::Downstream(msg.clone())),
            SrcResult::Ok if self.eos_queued => Err(Error::Eos),
            SrcResult::Ok => Ok(()),
        }
    }

    fn is_flushing(&self) -> bool {
        self.src_result == SrcResult::Flushing
    }

    /// `true` if `seq` sits at or before the last packet released, so an
    /// arrival for it can never be presented in order.
    fn is_too_late(&self, seq: u16) -> bool {
        match self.last_popped_seq {
            Some(last) => seq_diff(last, seq) <= 0,
            None => false,
        }
    }

    fn evict_for_latency_budget(&mut self) {
        if !self.cfg.drop_on_latency {
            return;
        }
        let Some(rate) = self.clock_rate_hz else { return };
        let max_span_ticks = u64::from(self.cfg.latency_ms) * u64::from(rate) / 1000;
        while self.store.len() > 1 && u64::from(self.store.ts_span()) >= max_span_ticks {
            let evicted = self.store.pop();
            log::warn!(
                "dropping seq={} to stay within latency budget ({}ms)",
                evicted.seq,
                self.cfg.latency_ms
            );
            // Open-question resolution: an eviction counts as a pop for
            // ordering purposes, so a later out-of-order arrival at or
            // before this seq is rejected as too-late rather than
            // reinserted.
            self.last_popped_seq = Some(evicted.seq);
        }
    }
}

/// Composed latency reported to an upstream latency query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Latency {
    Bounded(std::time::Duration),
    Unbounded,
}

/// Coordinates ingress, the ordered store, and a dedicated egress worker
/// thread that releases packets at their scheduled deadline.
pub struct JitterBuffer<C: Clock = SystemClock> {
    shared: Arc<Mutex<Shared>>,
    condvar: Arc<Condvar>,
    clock: Arc<C>,
    downstream: Arc<dyn Downstream>,
    resolver: Arc<dyn FormatResolver>,
    lifecycle: Lifecycle,
    started: AtomicBool,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl JitterBuffer<SystemClock> {
    pub fn new(
        cfg: Config,
        downstream: Arc<dyn Downstream>,
        resolver: Arc<dyn FormatResolver>,
    ) -> Result<Self> {
        Self::with_clock(cfg, downstream, resolver, SystemClock::new())
    }
}

impl<C: Clock> JitterBuffer<C> {
    pub fn with_clock(
        cfg: Config,
        downstream: Arc<dyn Downstream>,
        resolver: Arc<dyn FormatResolver>,
        clock: C,
    ) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            shared: Arc::new(Mutex::new(Shared::new(cfg))),
            condvar: Arc::new(Condvar::new()),
            clock: Arc::new(clock),
            downstream,
            resolver,
            lifecycle: Lifecycle::new(),
            started: AtomicBool::new(false),
            worker: Mutex::new(None),
        })
    }

    /// Spawn the egress worker thread. Idempotent: a second call is a
    /// no-op.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let shared = self.shared.clone();
        let condvar = self.condvar.clone();
        let clock = self.clock.clone();
        let downstream = self.downstream.clone();
        let resolver = self.resolver.clone();
        let handle = std::thread::Builder::new()
            .name("jbuf-egress".to_string())
            .spawn(move || egress_loop(shared, condvar, clock, downstream, resolver))
            .expect("spawning egress worker thread");
        *self.worker.lock() = Some(handle);
    }

    /// Signal the worker to exit and join it. Leaves the coordinator
    /// otherwise intact; not part of the flush protocol.
    pub fn shutdown(&self) {
        {
            let mut shared = self.shared.lock();
            shared.shutdown = true;
        }
        self.condvar.notify_all();
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }

    /// The current element lifecycle state.
    pub fn current_state(&self) -> State {
        self.lifecycle.current()
    }

    /// Drive the element lifecycle to `next`, applying the side effects
    /// the transition implies: `Paused` blocks the egress worker, `Playing`
    /// unblocks and wakes it, `Stopping` flushes and joins the worker.
    pub fn transition(&self, next: State) -> Result<State> {
        let previous = self.lifecycle.transition(next)?;
        match next {
            State::Paused => {
                self.shared.lock().blocked = true;
                self.condvar.notify_all();
            }
            State::Playing => {
                self.shared.lock().blocked = false;
                self.condvar.notify_all();
            }
            State::Stopping => {
                self.flush_start();
                self.shutdown();
            }
            State::Ready => {}
        }
        Ok(previous)
    }

    /// Ingress: parse a raw RTP packet buffer and push it.
    ///
    /// The byte-buffer entry point for callers that haven't already
    /// decoded the fixed header themselves; decode failures surface as
    /// [`Error::Decode`] rather than being silently dropped.
    pub fn push_payload(&self, bytes: &[u8]) -> Result<()> {
        let header = rtp::decode_header(bytes)?;
        let packet = Packet::new(header.sequence_number, header.timestamp, header.payload_type, bytes.to_vec());
        self.push(packet)
    }

    /// Ingress: push one packet into the store.
    ///
    /// The packet's payload type must already resolve to a clock rate —
    /// either because an earlier packet of the same type resolved it, or
    /// because [`Self::on_format`] supplied one explicitly — otherwise the
    /// packet is rejected with [`Error::NotNegotiated`] rather than
    /// buffered indefinitely.
    pub fn push(&self, packet: Packet) -> Result<()> {
        let mut shared = self.shared.lock();
        shared.check_pushable()?;

        if shared.is_too_late(packet.seq) {
            shared.late_count += 1;
            log::warn!("dropping late packet seq={}", packet.seq);
            return Ok(());
        }

        if shared.clock_rate_hz.is_none() {
            match self.resolver.resolve_pt(packet.pt) {
                Some(desc) => {
                    shared.clock_rate_hz = Some(desc.clock_rate_hz);
                    shared.current_pt = Some(packet.pt);
                }
                None => {
                    log::warn!("no clock rate negotiated for pt={}, rejecting packet", packet.pt);
                    return Err(Error::NotNegotiated);
                }
            }
        }

        let seq = packet.seq;
        if !shared.store.insert(packet) {
            shared.duplicate_count += 1;
            log::warn!("dropping duplicate packet seq={seq}");
            return Ok(());
        }

        shared.evict_for_latency_budget();
        drop(shared);
        self.condvar.notify_all();
        Ok(())
    }

    /// Ingress: explicitly supply the stream's format, bypassing payload
    /// type resolution. `clock_base` presets the 64-bit extended
    /// timestamp base instead of deriving it from the first sample seen;
    /// `seqnum_base` seeds the sequence number the worker expects next.
    pub fn on_format(&self, clock_rate_hz: u32, clock_base: Option<u32>, seqnum_base: Option<u16>) -> Result<()> {
        if clock_rate_hz == 0 {
            return Err(Error::InvalidConfig("clock rate must be non-zero".to_string()));
        }
        let mut shared = self.shared.lock();
        shared.clock_rate_hz = Some(clock_rate_hz);
        if let Some(base) = clock_base {
            shared.scheduler.set_clock_base(u64::from(base));
        }
        if let Some(seqnum_base) = seqnum_base {
            shared.next_expected_seq = Some(seqnum_base);
        }
        drop(shared);
        self.condvar.notify_all();
        Ok(())
    }

    /// Ingress: mark end-of-stream. Idempotent once EOS has been reached
    /// by the worker; returns an error if called again after that point.
    /// Takes effect once every resident packet has drained — it does not
    /// pre-empt packets still buffered under their own deadlines.
    pub fn signal_eos(&self) -> Result<()> {
        let mut shared = self.shared.lock();
        if shared.is_flushing() {
            return Err(Error::Flushing);
        }
        if shared.src_result == SrcResult::EosReached || shared.eos_queued {
            return Err(Error::Eos);
        }
        shared.eos_queued = true;
        drop(shared);
        self.condvar.notify_all();
        let flow = self.downstream.push_event(Event::Eos);
        if let FlowResult::Error(msg) = flow {
            log::warn!("downstream EOS event propagation failed: {msg}");
        }
        Ok(())
    }

    /// Ingress: a new stream segment. Propagates immediately; any packet
    /// still buffered under the prior segment is released under the new
    /// one, matching the original's "segment applies to future releases
    /// regardless of when its packets were enqueued" rule.
    pub fn on_segment(&self, rate: f64, start_ns: u64, time_ns: u64, format: TimeFormat) -> Result<()> {
        if format != TimeFormat::Time {
            return Err(Error::InvalidSegment);
        }
        let segment = Segment::new(rate, start_ns, time_ns)?;
        let mut shared = self.shared.lock();
        shared.segment = segment;
        drop(shared);
        self.condvar.notify_all();
        let flow = self.downstream.push_event(Event::Segment { rate, start_ns, time_ns });
        if let FlowResult::Error(msg) = flow {
            log::warn!("downstream segment event propagation failed: {msg}");
        }
        Ok(())
    }

    /// Control: begin a flush. Drops every buffered packet and rejects
    /// further ingress until [`Self::flush_stop`].
    pub fn flush_start(&self) {
        let mut shared = self.shared.lock();
        shared.src_result = SrcResult::Flushing;
        shared.blocked = false;
        shared.store.flush();
        shared.active_deadline = None;
        drop(shared);
        self.condvar.notify_all();
        let flow = self.downstream.push_event(Event::FlushStart);
        if let FlowResult::Error(msg) = flow {
            log::warn!("downstream flush-start event propagation failed: {msg}");
        }
    }

    /// Control: end a flush and recover from any latched downstream
    /// error, resuming normal operation.
    pub fn flush_stop(&self) {
        let mut shared = self.shared.lock();
        shared.src_result = SrcResult::Ok;
        shared.blocked = false;
        shared.eos_queued = false;
        shared.scheduler.reset();
        shared.last_popped_seq = None;
        shared.next_expected_seq = None;
        drop(shared);
        self.condvar.notify_all();
    }

    /// Control: forget the cached payload-type to clock-rate resolution,
    /// forcing the next packet of any payload type to be re-resolved.
    pub fn clear_format_cache(&self) {
        let mut shared = self.shared.lock();
        shared.clock_rate_hz = None;
        shared.current_pt = None;
    }

    /// Control: eagerly resolve and cache the clock rate for `pt`.
    pub fn request_format_for_pt(&self, pt: u8) {
        if let Some(desc) = self.resolver.resolve_pt(pt) {
            let mut shared = self.shared.lock();
            shared.clock_rate_hz = Some(desc.clock_rate_hz);
            shared.current_pt = Some(pt);
        }
    }

    /// Control: update the peer (upstream) latency contribution used when
    /// computing release deadlines.
    pub fn set_peer_latency_ns(&self, peer_latency_ns: u64) {
        self.shared.lock().peer_latency_ns = peer_latency_ns;
    }

    /// Control: mark the session as live (unbounded upstream latency) or
    /// not. Affects only [`Self::query_latency`].
    pub fn set_live(&self, live: bool) {
        self.shared.lock().live = live;
    }

    /// Control: update the configured buffering latency. Returns the
    /// reconfigure notification if the value actually changed.
    pub fn set_latency_ms(&self, latency_ms: u32) -> Option<crate::config::LatencyReconfigure> {
        let mut shared = self.shared.lock();
        if shared.cfg.latency_ms == latency_ms {
            return None;
        }
        let previous_ms = shared.cfg.latency_ms;
        shared.cfg.latency_ms = latency_ms;
        drop(shared);
        self.condvar.notify_all();
        Some(crate::config::LatencyReconfigure {
            previous_ms,
            current_ms: latency_ms,
        })
    }

    /// Composed latency this element reports upstream: its own configured
    /// latency plus whatever the peer reports, converted to a single
    /// `Duration` exactly once. A live session absorbs any finite value
    /// into [`Latency::Unbounded`].
    pub fn query_latency(&self) -> Latency {
        let shared = self.shared.lock();
        if shared.live {
            return Latency::Unbounded;
        }
        let total_ns = shared.peer_latency_ns + u64::from(shared.cfg.latency_ms) * 1_000_000;
        Latency::Bounded(std::time::Duration::from_nanos(total_ns))
    }

    pub fn late_count(&self) -> u64 {
        self.shared.lock().late_count
    }

    pub fn duplicate_count(&self) -> u64 {
        self.shared.lock().duplicate_count
    }

    pub fn buffered_len(&self) -> usize {
        self.shared.lock().store.len()
    }

    /// The deadline, in nanoseconds since construction, the worker is
    /// currently waiting on, if any.
    pub fn active_deadline_ns(&self) -> Option<u64> {
        self.shared.lock().active_deadline.map(|d| d.deadline_ns)
    }

    /// The clock this instance schedules releases against. Scenario tests
    /// use this to drive a [`crate::clock::FakeClock`] deterministically.
    pub fn clock(&self) -> Arc<C> {
        self.clock.clone()
    }
}

impl<C: Clock> Drop for JitterBuffer<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn egress_loop<C: Clock>(
    shared: Arc<Mutex<Shared>>,
    condvar: Arc<Condvar>,
    clock: Arc<C>,
    downstream: Arc<dyn Downstream>,
    resolver: Arc<dyn FormatResolver>,
) {
    loop {
        let mut guard = shared.lock();

        loop {
            if guard.shutdown {
                return;
            }
            if guard.is_flushing() || guard.blocked {
                condvar.wait(&mut guard);
                continue;
            }
            if !guard.store.is_empty() {
                break;
            }
            // EOS only fires once every real packet has drained: checking
            // `is_empty` here, not the presence of `eos_queued` alone,
            // keeps a late-arriving real packet's own deadline honored.
            if guard.eos_queued {
                break;
            }
            condvar.wait(&mut guard);
        }

        if guard.store.is_empty() {
            debug_assert!(guard.eos_queued, "only reachable via the eos_queued break above");
            let flow = MutexGuard::unlocked(&mut guard, || downstream.push_eos());
            guard.src_result = match flow {
                FlowResult::Ok => SrcResult::EosReached,
                FlowResult::Error(msg) => {
                    log::error!("downstream EOS push failed: {msg}");
                    guard.blocked = true;
                    SrcResult::PausedError(msg)
                }
            };
            drop(guard);
            condvar.notify_all();
            continue;
        }

        let (seq, rtp_ts, pt) = {
            let packet = guard.store.peek().expect("store non-empty, checked above");
            (packet.seq, packet.rtp_ts, packet.pt)
        };

        if guard.current_pt != Some(pt) || guard.clock_rate_hz.is_none() {
            if let Some(desc) = resolver.resolve_pt(pt) {
                guard.clock_rate_hz = Some(desc.clock_rate_hz);
                guard.current_pt = Some(pt);
            }
        }

        let deadline_ns = {
            let rate = match guard.clock_rate_hz {
                Some(r) => r,
                None => {
                    log::trace!("no clock rate resolved yet for pt={pt}, waiting");
                    condvar.wait(&mut guard);
                    continue;
                }
            };
            let segment = guard.segment;
            let latency_ms = guard.cfg.latency_ms;
            let peer_latency_ns = guard.peer_latency_ns;
            guard.scheduler.deadline_ns(rtp_ts, rate, &segment, latency_ms, peer_latency_ns)
        };

        guard.active_deadline = Some(ActiveDeadline { waiting_seq: seq, deadline_ns });

        let outcome = clock.wait_until(&condvar, &mut guard, deadline_ns, &mut |s: &Shared| {
            s.shutdown || s.is_flushing() || s.store.peek_seq() != Some(seq)
        });
        guard.active_deadline = None;

        match outcome {
            WaitOutcome::Cancelled => continue,
            WaitOutcome::Elapsed => {
                if guard.store.peek_seq() != Some(seq) {
                    // Raced with a cancellation that the predicate hadn't
                    // yet observed when the deadline also elapsed; let the
                    // outer loop re-evaluate from scratch.
                    continue;
                }
                let mut packet = guard.store.pop();
                let discontinuous_gap = match guard.next_expected_seq {
                    Some(expected) if expected != packet.seq => {
                        let gap = seq_diff(expected, packet.seq);
                        log::debug!("gap of {gap} before seq={}", packet.seq);
                        guard.late_count += 1;
                        true
                    }
                    _ => false,
                };
                guard.next_expected_seq = Some(seq_next(packet.seq));
                guard.last_popped_seq = Some(packet.seq);

                // ts_offset is applied to the released packet's own
                // rtp_ts, not folded into the deadline computation above;
                // a change since the last release marks a discontinuity.
                let ts_offset_ns = guard.cfg.ts_offset_ns;
                let offset_changed = ts_offset_ns != guard.prev_ts_offset_ns;
                guard.prev_ts_offset_ns = ts_offset_ns;
                if let Some(rate) = guard.clock_rate_hz {
                    let ticks = ts_offset_to_rtp_ticks(ts_offset_ns, rate);
                    packet.rtp_ts = packet.rtp_ts.wrapping_add(ticks as u32);
                }
                let discontinuous = discontinuous_gap || offset_changed;

                let flow = MutexGuard::unlocked(&mut guard, || downstream.push(packet, discontinuous));
                if let FlowResult::Error(msg) = flow {
                    log::error!("downstream push failed: {msg}");
                    guard.src_result = SrcResult::PausedError(msg);
                    guard.blocked = true;
                }
                drop(guard);
                condvar.notify_all();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use crate::format::StaticFormatTable;
    use crate::sink::test_support::RecordingSink;

    fn rig(cfg: Config) -> (Arc<JitterBuffer<FakeClock>>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let resolver = Arc::new(StaticFormatTable::new().with_rate(96, 8_000));
        let jb = Arc::new(
            JitterBuffer::with_clock(cfg, sink.clone(), resolver, FakeClock::new()).unwrap(),
        );
        jb.start();
        (jb, sink)
    }

    fn pkt(seq: u16, rtp_ts: u32) -> Packet {
        Packet::new(seq, rtp_ts, 96, vec![1, 2, 3])
    }

    #[test]
    fn packets_stay_buffered_while_the_clock_never_advances() {
        let cfg = Config::default().with_latency_ms(20);
        let (jb, sink) = rig(cfg);
        jb.push(pkt(1, 0)).unwrap();
        jb.push(pkt(2, 160)).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(jb.buffered_len(), 2);
        assert!(sink.seqs().is_empty());
    }

    #[test]
    fn duplicate_push_is_counted_and_dropped() {
        let cfg = Config::default();
        let (jb, _sink) = rig(cfg);
        jb.push(pkt(1, 0)).unwrap();
        jb.push(pkt(1, 0)).unwrap();
        assert_eq!(jb.duplicate_count(), 1);
        assert_eq!(jb.buffered_len(), 1);
    }

    #[test]
    fn flush_start_then_stop_clears_state_and_resumes() {
        let cfg = Config::default();
        let (jb, _sink) = rig(cfg);
        jb.push(pkt(1, 0)).unwrap();
        jb.flush_start();
        assert_eq!(jb.buffered_len(), 0);
        assert!(jb.push(pkt(2, 0)).is_err());
        jb.flush_stop();
        assert!(jb.push(pkt(2, 0)).is_ok());
    }

    #[test]
    fn query_latency_composes_once_and_absorbs_infinite() {
        let cfg = Config::default().with_latency_ms(50);
        let (jb, _sink) = rig(cfg);
        jb.set_peer_latency_ns(10_000_000);
        assert_eq!(
            jb.query_latency(),
            Latency::Bounded(std::time::Duration::from_nanos(60_000_000))
        );
        jb.set_live(true);
        assert_eq!(jb.query_latency(), Latency::Unbounded);
    }

    #[test]
    fn set_latency_ms_reports_change_only_once() {
        let cfg = Config::default().with_latency_ms(50);
        let (jb, _sink) = rig(cfg);
        let reconfigure = jb.set_latency_ms(80).unwrap();
        assert_eq!(reconfigure.previous_ms, 50);
        assert_eq!(reconfigure.current_ms, 80);
        assert!(jb.set_latency_ms(80).is_none());
    }

    #[test]
    fn push_without_resolvable_format_is_rejected() {
        let sink = Arc::new(RecordingSink::new());
        let resolver = Arc::new(StaticFormatTable::new());
        let jb = JitterBuffer::with_clock(Config::default(), sink, resolver, FakeClock::new()).unwrap();
        jb.start();
        assert!(matches!(jb.push(pkt(1, 0)), Err(Error::NotNegotiated)));
        assert_eq!(jb.buffered_len(), 0);
    }

    #[test]
    fn on_format_unblocks_a_previously_unresolvable_pt() {
        let sink = Arc::new(RecordingSink::new());
        let resolver = Arc::new(StaticFormatTable::new());
        let jb = JitterBuffer::with_clock(Config::default(), sink, resolver, FakeClock::new()).unwrap();
        jb.start();
        jb.on_format(8_000, None, None).unwrap();
        assert!(jb.push(pkt(1, 0)).is_ok());
    }

    #[test]
    fn eos_does_not_fire_until_resident_packets_drain() {
        let cfg = Config::default().with_latency_ms(20);
        let (jb, sink) = rig(cfg);
        jb.push(pkt(1, 0)).unwrap();
        jb.signal_eos().unwrap();
        // Pushing after EOS has been requested is rejected immediately,
        // independent of whether the worker has drained yet.
        assert!(jb.push(pkt(2, 160)).is_err());
        assert_eq!(jb.buffered_len(), 1);
        assert!(sink.releases().is_empty());
    }

    #[test]
    fn lifecycle_paused_blocks_the_worker() {
        let cfg = Config::default().with_latency_ms(0);
        let (jb, sink) = rig(cfg);
        jb.transition(State::Paused).unwrap();
        jb.push(pkt(1, 0)).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(sink.seqs().is_empty());
        jb.transition(State::Playing).unwrap();
    }
}

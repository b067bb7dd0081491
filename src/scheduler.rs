//! Release-deadline computation.
//!
//! Converting a packet's RTP timestamp into a release deadline is a pure
//! function of state carried across packets (the extended timestamp and
//! the clock-base it's measured from) plus per-call parameters (clock
//! rate, segment, configured latency, peer latency). Keeping it pure and
//! separate from the coordinator's locking makes the arithmetic itself
//! trivially testable, and guarantees deadline idempotence: identical
//! inputs always produce an identical deadline, with no wall-clock
//! dependency smuggled in.

use crate::ext_ts::ExtTimestamp;
use crate::segment::Segment;

/// State carried across packets to compute deadlines. Reset only on
/// flush-stop.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    ext_ts: ExtTimestamp,
    clock_base_ext: Option<u64>,
}

impl SchedulerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.ext_ts.reset();
        self.clock_base_ext = None;
    }

    /// Explicitly seed the clock base, e.g. from an upstream `on_format`'s
    /// `clock_base`, instead of letting it default to the first extended
    /// timestamp seen.
    pub fn set_clock_base(&mut self, base_ext: u64) {
        self.clock_base_ext = Some(base_ext);
    }

    /// Compute the release deadline, in nanoseconds of running time
    /// relative to the element's base time, for a packet carrying RTP
    /// timestamp `rtp_ts`.
    ///
    /// `clock_rate_hz` must be non-zero; callers resolve it from the
    /// payload type before calling and must not call this until they have.
    /// The RTP timestamp offset is not applied here: it is folded into the
    /// packet's own `rtp_ts` right before release, not into the deadline.
    pub fn deadline_ns(
        &mut self,
        rtp_ts: u32,
        clock_rate_hz: u32,
        segment: &Segment,
        latency_ms: u32,
        peer_latency_ns: u64,
    ) -> u64 {
        debug_assert!(clock_rate_hz > 0, "clock rate must be resolved before scheduling");

        let ext = self.ext_ts.extend(rtp_ts);
        let base = *self.clock_base_ext.get_or_insert(ext);
        let ext_rel = ext.wrapping_sub(base);

        let media_ns = (u128::from(ext_rel) * 1_000_000_000u128 / u128::from(clock_rate_hz)) as u64;
        let running_ns = segment.to_running_time(media_ns);
        running_ns + u64::from(latency_ms) * 1_000_000 + peer_latency_ns
    }
}

/// Convert a nanosecond timestamp offset to RTP clock ticks, rounding
/// toward zero, preserving sign by converting the magnitude and
/// re-applying it.
///
/// Used to fold `ts_offset_ns` into a released packet's `rtp_ts`, per the
/// egress path rather than the deadline computation above.
pub fn ts_offset_to_rtp_ticks(ts_offset_ns: i64, clock_rate_hz: u32) -> i32 {
    let magnitude = (i128::from(ts_offset_ns.unsigned_abs()) * i128::from(clock_rate_hz) / 1_000_000_000i128) as i64;
    let signed = if ts_offset_ns < 0 { -magnitude } else { magnitude };
    signed as i32
}

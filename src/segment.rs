//! Stream-segment time mapping.
//!
//! Upstream announces a segment (rate, start, and a running-time offset)
//! before media flows; the scheduler converts a buffer's media-time
//! timestamp into running time through it. A freshly constructed element
//! uses the identity segment, under which running time equals media time.

/// Time format carried by an upstream segment event.
///
/// Only `Time` is supported; any other format is rejected at the ingress
/// boundary rather than approximated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeFormat {
    Time,
    Other(String),
}

/// Linear time mapping from a buffer's media-time position to running time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Playback rate; `1.0` for normal forward playback.
    pub rate: f64,
    /// Media-time position, in nanoseconds, that running time `time_ns`
    /// corresponds to.
    pub start_ns: u64,
    /// Running-time offset, in nanoseconds, of `start_ns`.
    pub time_ns: u64,
}

impl Default for Segment {
    fn default() -> Self {
        Self {
            rate: 1.0,
            start_ns: 0,
            time_ns: 0,
        }
    }
}

impl Segment {
    /// Construct a segment from an upstream segment event's fields.
    ///
    /// Returns an error if `rate` is non-positive; backward playback and
    /// stop-position clamping are out of scope for this crate.
    pub fn new(rate: f64, start_ns: u64, time_ns: u64) -> crate::error::Result<Self> {
        if !(rate > 0.0) {
            return Err(crate::error::Error::InvalidSegment);
        }
        Ok(Self {
            rate,
            start_ns,
            time_ns,
        })
    }

    /// Map a media-time timestamp to running time.
    ///
    /// Timestamps before `start_ns` clamp to `time_ns`, matching the usual
    /// convention of treating pre-segment data as arriving at the segment's
    /// leading edge rather than producing a negative running time.
    pub fn to_running_time(&self, media_ns: u64) -> u64 {
        let elapsed = media_ns.saturating_sub(self.start_ns);
        self.time_ns + (elapsed as f64 / self.rate) as u64
    }
}

//! Jitter buffer configuration.
//!
//! Loading these values from a file, environment, or negotiated caps is an
//! external concern; this module only owns the plain data and the
//! validation of it, in the style of the teacher crate's QoS policy structs
//! (plain fields, a `Default` matching the documented defaults, small
//! validating setters).

use crate::error::Result;

/// Tunable parameters for a jitter buffer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Added buffering latency, in milliseconds.
    pub latency_ms: u32,
    /// When `true`, ingress drops the oldest resident packet rather than
    /// growing the store past `latency_ms` worth of RTP-timestamp span.
    pub drop_on_latency: bool,
    /// Constant offset, in nanoseconds, added to each released packet's RTP
    /// timestamp. Changing this value marks a discontinuity on the next
    /// release.
    pub ts_offset_ns: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            latency_ms: 200,
            drop_on_latency: false,
            ts_offset_ns: 0,
        }
    }
}

impl Config {
    /// Builder-style setter for `latency_ms`.
    #[must_use]
    pub fn with_latency_ms(mut self, latency_ms: u32) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Builder-style setter for `drop_on_latency`.
    #[must_use]
    pub fn with_drop_on_latency(mut self, drop_on_latency: bool) -> Self {
        self.drop_on_latency = drop_on_latency;
        self
    }

    /// Builder-style setter for `ts_offset_ns`.
    #[must_use]
    pub fn with_ts_offset_ns(mut self, ts_offset_ns: i64) -> Self {
        self.ts_offset_ns = ts_offset_ns;
        self
    }

    /// Validate the configuration, rejecting values that can never produce
    /// a sensible jitter buffer (there currently are none that this crate
    /// rejects outright, but the hook exists for future constraints and
    /// mirrors the teacher's `QoS` validation entrypoints).
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Notification emitted by the control surface when `latency_ms` changes
/// after construction, so the enclosing pipeline can re-run latency
/// negotiation (GStreamer calls this a "reconfigure latency" message; we
/// keep the same two-field shape: old and new value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyReconfigure {
    pub previous_ms: u32,
    pub current_ms: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.latency_ms, 200);
        assert!(!cfg.drop_on_latency);
        assert_eq!(cfg.ts_offset_ns, 0);
    }

    #[test]
    fn builder_chains() {
        let cfg = Config::default()
            .with_latency_ms(50)
            .with_drop_on_latency(true)
            .with_ts_offset_ns(-1000);
        assert_eq!(cfg.latency_ms, 50);
        assert!(cfg.drop_on_latency);
        assert_eq!(cfg.ts_offset_ns, -1000);
    }
}

//! Extension of 32-bit RTP timestamps into a monotonically increasing
//! 64-bit form.
//!
//! A 32-bit RTP timestamp wraps roughly every 6 hours at an 8kHz clock rate
//! (sooner at higher rates); the rest of the scheduler wants a timestamp
//! axis that only ever increases. [`extend`] carries that 64-bit value
//! across calls, advancing it by whatever signed 32-bit distance the new
//! sample sits from the low bits of the previous one. That distance wraps
//! the same way [`crate::seq::seq_diff`] does, which is what gives the
//! "nearest neighbour within ±2^31" rule: a new timestamp is always treated
//! as the closest point to the previous one, never as a multi-wrap jump.

/// Running extended-timestamp state. Reset only on flush-stop.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtTimestamp {
    prev: Option<u64>,
}

impl ExtTimestamp {
    pub fn new() -> Self {
        Self { prev: None }
    }

    /// Fold `ts` into the running extended timestamp and return the new
    /// 64-bit value. The first call seeds the state with `ts` verbatim.
    pub fn extend(&mut self, ts: u32) -> u64 {
        let next = match self.prev {
            None => u64::from(ts),
            Some(prev) => {
                let diff = ts.wrapping_sub(prev as u32) as i32;
                (prev as i64 + i64::from(diff)) as u64
            }
        };
        self.prev = Some(next);
        next
    }

    /// Discard carried state; the next [`Self::extend`] call re-seeds it.
    pub fn reset(&mut self) {
        self.prev = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_seeds_state() {
        let mut e = ExtTimestamp::new();
        assert_eq!(e.extend(1_000), 1_000);
    }

    #[test]
    fn monotonic_increase_within_one_wrap() {
        let mut e = ExtTimestamp::new();
        e.extend(1_000);
        assert_eq!(e.extend(1_160), 1_160);
        assert_eq!(e.extend(1_320), 1_320);
    }

    #[test]
    fn wraps_forward_across_u32_boundary() {
        let mut e = ExtTimestamp::new();
        e.extend(u32::MAX - 10);
        let ext = e.extend(50);
        assert_eq!(ext, u64::from(u32::MAX) + 61);
    }

    #[test]
    fn small_backward_jitter_does_not_unwrap() {
        let mut e = ExtTimestamp::new();
        e.extend(10_000);
        // a slightly out-of-order sample with a smaller RTP timestamp
        let ext = e.extend(9_840);
        assert_eq!(ext, 9_840);
    }

    #[test]
    fn reset_reseeds_from_scratch() {
        let mut e = ExtTimestamp::new();
        e.extend(500_000);
        e.reset();
        assert_eq!(e.extend(10), 10);
    }
}

//! Cancellable, deadline-based waiting for the egress worker.
//!
//! The worker's only suspension point sleeps until a packet's release
//! deadline while holding no other lock than the coordinator's own mutex,
//! which it releases for the duration of the wait and reacquires before
//! looking at anything again. Wakeups are level-triggered: every time the
//! condvar returns, the caller re-checks the actual condition (flushing
//! requested, a newer packet unscheduling the current wait, or the
//! deadline itself) rather than trusting that the wakeup implies a
//! particular cause.
//!
//! The wait is expressed against a [`Clock`] rather than directly against
//! `Instant::now()` so that scenario tests can drive it with a
//! manually-steppable fake instead of real sleeps, the same way the
//! teacher crate substitutes a test double for wall-clock time in its
//! `reliability` test suite.

use parking_lot::{Condvar, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Why a deadline wait returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The deadline was reached without cancellation.
    Elapsed,
    /// The wait was cancelled before the deadline (a newer packet arrived
    /// and unscheduled the wait, or a flush was requested).
    Cancelled,
}

/// A source of monotonic time the egress worker schedules releases
/// against.
///
/// All deadlines are nanosecond offsets from an implementation-defined
/// epoch fixed when the clock is constructed; callers never interpret
/// them as wall-clock time directly.
pub trait Clock: Send + Sync + 'static {
    /// Nanoseconds elapsed since this clock's epoch.
    fn now_ns(&self) -> u64;

    /// Block the thread holding `guard` until either `deadline_ns` passes,
    /// per [`Self::now_ns`], or `is_cancelled` reports `true`. Returns the
    /// outcome; `guard` is left locked either way.
    fn wait_until<T>(
        &self,
        condvar: &Condvar,
        guard: &mut MutexGuard<'_, T>,
        deadline_ns: u64,
        is_cancelled: &mut dyn FnMut(&T) -> bool,
    ) -> WaitOutcome;
}

/// Production clock: `now_ns()` backed by [`Instant`], waits backed by a
/// real `parking_lot::Condvar` timed wait.
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    fn wait_until<T>(
        &self,
        condvar: &Condvar,
        guard: &mut MutexGuard<'_, T>,
        deadline_ns: u64,
        is_cancelled: &mut dyn FnMut(&T) -> bool,
    ) -> WaitOutcome {
        let deadline = self.epoch + Duration::from_nanos(deadline_ns);
        loop {
            if is_cancelled(guard) {
                return WaitOutcome::Cancelled;
            }
            let now = Instant::now();
            if now >= deadline {
                return WaitOutcome::Elapsed;
            }
            let timed_out = condvar.wait_until(guard, deadline).timed_out();
            if is_cancelled(guard) {
                return WaitOutcome::Cancelled;
            }
            if timed_out {
                return WaitOutcome::Elapsed;
            }
            // spurious wakeup before deadline and before cancellation: loop
        }
    }
}

/// A manually-steppable clock for deterministic scenario tests.
///
/// `now_ns()` reports a virtual time advanced only by explicit calls to
/// [`Self::advance`], never by real elapsed time. Waits poll at a short
/// real interval so a concurrent `advance()` call is observed promptly
/// without needing a dedicated wakeup channel; the poll interval only
/// bounds how quickly a test's `advance()` is *noticed*, never what the
/// wait decides, so it introduces no flakiness.
pub struct FakeClock {
    virtual_now_ns: AtomicU64,
}

impl FakeClock {
    pub fn new() -> Self {
        Self { virtual_now_ns: AtomicU64::new(0) }
    }

    /// Advance virtual time by `delta_ns`.
    pub fn advance(&self, delta_ns: u64) {
        self.virtual_now_ns.fetch_add(delta_ns, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(5);

impl Clock for FakeClock {
    fn now_ns(&self) -> u64 {
        self.virtual_now_ns.load(Ordering::SeqCst)
    }

    fn wait_until<T>(
        &self,
        condvar: &Condvar,
        guard: &mut MutexGuard<'_, T>,
        deadline_ns: u64,
        is_cancelled: &mut dyn FnMut(&T) -> bool,
    ) -> WaitOutcome {
        loop {
            if is_cancelled(guard) {
                return WaitOutcome::Cancelled;
            }
            if self.now_ns() >= deadline_ns {
                return WaitOutcome::Elapsed;
            }
            condvar.wait_for(guard, POLL_INTERVAL);
            if is_cancelled(guard) {
                return WaitOutcome::Cancelled;
            }
            if self.now_ns() >= deadline_ns {
                return WaitOutcome::Elapsed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn system_clock_elapses_when_never_cancelled() {
        let clock = SystemClock::new();
        let lock = Mutex::new(());
        let condvar = Condvar::new();
        let mut guard = lock.lock();
        let outcome = clock.wait_until(&condvar, &mut guard, 20_000_000, &mut |_| false);
        assert_eq!(outcome, WaitOutcome::Elapsed);
    }

    #[test]
    fn system_clock_past_deadline_returns_immediately() {
        let clock = SystemClock::new();
        let lock = Mutex::new(());
        let condvar = Condvar::new();
        let mut guard = lock.lock();
        let started = Instant::now();
        let outcome = clock.wait_until(&condvar, &mut guard, 0, &mut |_| false);
        assert_eq!(outcome, WaitOutcome::Elapsed);
        assert!(started.elapsed() < Duration::from_millis(20));
    }

    #[test]
    fn system_clock_cancellation_wakes_the_waiter_early() {
        let clock = Arc::new(SystemClock::new());
        let lock = Arc::new(Mutex::new(false));
        let condvar = Arc::new(Condvar::new());

        let t_clock = clock.clone();
        let t_lock = lock.clone();
        let t_condvar = condvar.clone();
        let handle = std::thread::spawn(move || {
            let mut guard = t_lock.lock();
            t_clock.wait_until(&t_condvar, &mut guard, 5_000_000_000, &mut |c: &bool| *c)
        });

        std::thread::sleep(Duration::from_millis(20));
        *lock.lock() = true;
        condvar.notify_all();

        assert_eq!(handle.join().unwrap(), WaitOutcome::Cancelled);
    }

    #[test]
    fn fake_clock_never_elapses_without_advance() {
        let clock = FakeClock::new();
        assert_eq!(clock.now_ns(), 0);
        clock.advance(1_000);
        assert_eq!(clock.now_ns(), 1_000);
    }

    #[test]
    fn fake_clock_wait_elapses_after_advance_from_another_thread() {
        let clock = Arc::new(FakeClock::new());
        let lock = Arc::new(Mutex::new(()));
        let condvar = Arc::new(Condvar::new());

        let t_clock = clock.clone();
        let t_lock = lock.clone();
        let t_condvar = condvar.clone();
        let handle = std::thread::spawn(move || {
            let mut guard = t_lock.lock();
            t_clock.wait_until(&t_condvar, &mut guard, 100, &mut |_| false)
        });

        clock.advance(200);
        assert_eq!(handle.join().unwrap(), WaitOutcome::Elapsed);
    }
}

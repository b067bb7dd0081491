//! Element lifecycle state machine.
//!
//! Grounded on the original jitter buffer's GStreamer state-change
//! handling (`NULL`/`READY`/`PAUSED`/`PLAYING`): a small linear state
//! machine that rejects transitions skipping over an intermediate state,
//! kept separate from the coordinator's own data-flow state (`src_result`,
//! `blocked`) since the two vary independently — an element can be
//! `Paused` with packets still buffered, or `Playing` with an empty store.

use crate::error::{Error, Result};
use parking_lot::Mutex;

/// Element lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Ready,
    Paused,
    Playing,
    Stopping,
}

impl State {
    fn can_transition_to(self, next: State) -> bool {
        use State::{Paused, Playing, Ready, Stopping};
        matches!(
            (self, next),
            (Ready, Paused) | (Paused, Playing) | (Playing, Paused) | (Paused, Stopping) | (Playing, Stopping) | (Stopping, Ready)
        )
    }
}

/// Thread-safe wrapper around [`State`] enforcing legal transitions.
pub struct Lifecycle {
    state: Mutex<State>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self { state: Mutex::new(State::Ready) }
    }

    pub fn current(&self) -> State {
        *self.state.lock()
    }

    /// Attempt a transition to `next`, returning the previous state on
    /// success. Rejects any transition [`State::can_transition_to`]
    /// doesn't allow.
    pub fn transition(&self, next: State) -> Result<State> {
        let mut state = self.state.lock();
        if !state.can_transition_to(next) {
            return Err(Error::InvalidConfig(format!(
                "illegal lifecycle transition {state:?} -> {next:?}"
            )));
        }
        let previous = *state;
        *state = next;
        log::debug!("lifecycle: {previous:?} -> {next:?}");
        Ok(previous)
    }
}

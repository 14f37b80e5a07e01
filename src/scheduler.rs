//! Poll scheduler — decides when the next full-state read is due.
//!
//! A single deadline compared against the monotonic clock each tick,
//! with three cadences:
//!
//! ```text
//!                     ┌───────────── read ok: +poll_interval ─────────────┐
//!                     ▼                                                   │
//! AwaitingFirstRead ──▶ Polling ──▶ Idle ──(deadline)──▶ Polling ─────────┘
//!        ▲                │            │                    │
//!        └─ read failed ──┘            │ write issued       └─ read failed:
//!           +retry_interval            ▼                       +retry_interval
//!                                  Settling ──(deadline)──▶ Polling
//!                               +settle_window
//! ```
//!
//! Settling coalesces a burst of writes into one subsequent read: every
//! write pushes the deadline back to `now + settle_window`.

use log::{debug, info, warn};

use crate::config::DriverConfig;

/// Scheduler state.  `Polling` only exists for the duration of the
/// blocking read inside one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    AwaitingFirstRead,
    Idle,
    Polling,
    Settling,
}

/// The three named poll cadences (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollCadence {
    pub normal_ms: u32,
    pub retry_ms: u32,
    pub settle_ms: u32,
    pub heartbeat_ms: u32,
}

impl From<&DriverConfig> for PollCadence {
    fn from(c: &DriverConfig) -> Self {
        Self {
            normal_ms: c.poll_interval_ms,
            retry_ms: c.retry_interval_ms,
            settle_ms: c.settle_window_ms,
            heartbeat_ms: c.heartbeat_interval_ms,
        }
    }
}

/// Deadline-driven poll scheduler.
pub struct PollScheduler {
    cadence: PollCadence,
    state: PollState,
    /// Monotonic time at which the next read is due.
    next_due_ms: u64,
    last_heartbeat_ms: u64,
    /// True once the first frame has validated.
    initialised: bool,
}

impl PollScheduler {
    /// Starts in `AwaitingFirstRead` with the first read due immediately.
    pub fn new(cadence: PollCadence) -> Self {
        Self {
            cadence,
            state: PollState::AwaitingFirstRead,
            next_due_ms: 0,
            last_heartbeat_ms: 0,
            initialised: false,
        }
    }

    /// Advance the scheduler to `now_ms`.
    ///
    /// `dirty` reports whether a command was sent since the last tick.
    /// Returns `true` when a full-state read must be issued now; the
    /// caller then reports the outcome via [`record_success`] or
    /// [`record_failure`].
    ///
    /// [`record_success`]: Self::record_success
    /// [`record_failure`]: Self::record_failure
    pub fn tick(&mut self, now_ms: u64, dirty: bool) -> bool {
        if now_ms.saturating_sub(self.last_heartbeat_ms) >= u64::from(self.cadence.heartbeat_ms) {
            debug!("Waiting... ({:?}, next read at {} ms)", self.state, self.next_due_ms);
            self.last_heartbeat_ms = now_ms;
        }

        if dirty {
            self.next_due_ms = now_ms + u64::from(self.cadence.settle_ms);
            if self.initialised {
                self.state = PollState::Settling;
            }
        }

        if now_ms >= self.next_due_ms {
            self.state = PollState::Polling;
            return true;
        }
        false
    }

    /// A frame validated: resume the normal cadence.
    pub fn record_success(&mut self, now_ms: u64) {
        if !self.initialised {
            info!("First status frame validated");
        }
        self.initialised = true;
        self.state = PollState::Idle;
        self.next_due_ms = now_ms + u64::from(self.cadence.normal_ms);
    }

    /// The read failed: retry sooner than the normal cadence.
    pub fn record_failure(&mut self, now_ms: u64) {
        warn!("Status read failed, retrying in {} ms", self.cadence.retry_ms);
        self.state = if self.initialised {
            PollState::Idle
        } else {
            PollState::AwaitingFirstRead
        };
        self.next_due_ms = now_ms + u64::from(self.cadence.retry_ms);
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn next_due_ms(&self) -> u64 {
        self.next_due_ms
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

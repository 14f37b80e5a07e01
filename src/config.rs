//! Driver configuration parameters
//!
//! All tunable timings and framing limits for the SpaNet serial driver.
//! The three poll cadences (normal, failure-retry, post-write settle) live
//! here rather than as literals in the scheduler.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::protocol::frame::FRAME_MAX_FIELDS;

/// Core driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverConfig {
    // --- Link ---
    /// UART baud rate (the board talks 8N1)
    pub baud_rate: u32,

    // --- Poll cadence ---
    /// Delay between full-state reads after a good frame (milliseconds)
    pub poll_interval_ms: u32,
    /// Delay before retrying after a failed read (milliseconds)
    pub retry_interval_ms: u32,
    /// Poll deferral after a write, coalescing bursts of commands (milliseconds)
    pub settle_window_ms: u32,

    // --- Command channel ---
    /// Maximum wait for the first response byte after a command (milliseconds)
    pub response_timeout_ms: u32,
    /// Bounded wait for one field or line to arrive (milliseconds)
    pub field_timeout_ms: u32,
    /// Pause between the wake-up newline and the command (milliseconds)
    pub command_settle_ms: u32,
    /// Upper bound on bytes drained when discarding stale input
    pub discard_limit: usize,

    // --- Framing ---
    /// Minimum number of fields for a full-state frame to be accepted
    pub frame_min_fields: usize,

    // --- Diagnostics ---
    /// Interval of the scheduler's "waiting" heartbeat log (milliseconds)
    pub heartbeat_interval_ms: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            // Link
            baud_rate: 38_400,

            // Poll cadence
            poll_interval_ms: 10_000,
            retry_interval_ms: 1_000,
            settle_window_ms: 200,

            // Command channel
            response_timeout_ms: 1_000,
            field_timeout_ms: 250,
            command_settle_ms: 50,
            discard_limit: 5_120,

            // Framing
            frame_min_fields: 280,

            // Diagnostics
            heartbeat_interval_ms: 1_000,
        }
    }
}

impl DriverConfig {
    /// Reject values that would make the driver busy-loop or never accept
    /// a frame.
    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(Error::Config("baud_rate must be non-zero"));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be non-zero"));
        }
        if self.retry_interval_ms == 0 || self.retry_interval_ms >= self.poll_interval_ms {
            return Err(Error::Config(
                "retry_interval_ms must be non-zero and below poll_interval_ms",
            ));
        }
        if self.settle_window_ms == 0 || self.settle_window_ms >= self.poll_interval_ms {
            return Err(Error::Config(
                "settle_window_ms must be non-zero and below poll_interval_ms",
            ));
        }
        if self.response_timeout_ms == 0 || self.field_timeout_ms == 0 {
            return Err(Error::Config("channel timeouts must be non-zero"));
        }
        if self.discard_limit == 0 {
            return Err(Error::Config("discard_limit must be non-zero"));
        }
        if !(1..=FRAME_MAX_FIELDS).contains(&self.frame_min_fields) {
            return Err(Error::Config(
                "frame_min_fields must be between 1 and the frame capacity",
            ));
        }
        if self.heartbeat_interval_ms == 0 {
            return Err(Error::Config("heartbeat_interval_ms must be non-zero"));
        }
        Ok(())
    }
}

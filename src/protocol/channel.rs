//! Command channel — one command line out, response bytes in.
//!
//! Every exchange follows the same choreography:
//! ```text
//!   discard stale input ─▶ "\n" ─▶ settle ─▶ "<CODE>[:<value>]\n"
//!        ─▶ busy-wait (bounded) for the first response byte
//! ```
//! The board has no message IDs, so draining the receive buffer before
//! each command is the only thing keeping a late reply to one command
//! from being read as the answer to the next.

use embedded_hal::delay::DelayNs;
use log::{debug, trace, warn};

use crate::app::ports::{Clock, Transport};
use crate::config::DriverConfig;
use crate::error::TransportError;
use crate::protocol::frame::FieldSource;

/// Timing knobs the channel needs, lifted out of [`DriverConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelTiming {
    pub response_timeout_ms: u32,
    pub field_timeout_ms: u32,
    pub command_settle_ms: u32,
    pub discard_limit: usize,
}

impl From<&DriverConfig> for ChannelTiming {
    fn from(c: &DriverConfig) -> Self {
        Self {
            response_timeout_ms: c.response_timeout_ms,
            field_timeout_ms: c.field_timeout_ms,
            command_settle_ms: c.command_settle_ms,
            discard_limit: c.discard_limit,
        }
    }
}

/// Owns the transport and the blocking primitives around it.
pub struct CommandChannel<T, C, D> {
    transport: T,
    clock: C,
    delay: D,
    timing: ChannelTiming,
    /// Set by every command sent; board state may have changed.
    dirty: bool,
}

impl<T, C, D> CommandChannel<T, C, D>
where
    T: Transport,
    C: Clock,
    D: DelayNs,
{
    pub fn new(transport: T, clock: C, delay: D, timing: ChannelTiming) -> Self {
        Self {
            transport,
            clock,
            delay,
            timing,
            dirty: false,
        }
    }

    /// Current monotonic time from the channel's clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Whether a command has been sent since the flag was last taken.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        core::mem::take(&mut self.dirty)
    }

    /// Drain whatever is sitting in the receive buffer, bounded so a
    /// transport that never stops reporting data cannot hang the loop.
    /// Returns the number of bytes dropped.
    pub fn discard_pending(&mut self) -> usize {
        let pending = self.transport.available();
        let mut dropped = 0;
        while dropped < self.timing.discard_limit && self.transport.available() > 0 {
            match self.transport.read_byte() {
                Some(b) => trace!("{},", b),
                None => break,
            }
            dropped += 1;
        }
        if pending > 0 {
            debug!(
                "Discarded {} stale bytes ({} still buffered)",
                dropped,
                self.transport.available()
            );
        }
        dropped
    }

    /// Send one command line and wait (bounded) for the board to start
    /// answering.  Always marks the channel dirty: even a rejected write
    /// may have changed board state.
    pub fn send(&mut self, command: &str) {
        self.discard_pending();

        debug!("Sending - {}", command);
        if let Err(e) = self.write_line(b"") {
            warn!("Wake-up newline failed: {}", e);
        }
        self.delay.delay_ms(self.timing.command_settle_ms);
        if let Err(e) = self.write_line(command.as_bytes()) {
            warn!("Command {:?} failed: {}", command, e);
        }

        let deadline = self
            .clock
            .now_ms()
            .saturating_add(u64::from(self.timing.response_timeout_ms));
        trace!("Start waiting for a response");
        while self.transport.available() == 0 && self.clock.now_ms() < deadline {}
        trace!("Finish waiting");

        self.dirty = true;
    }

    /// Send a command and return its one-line reply with the terminator
    /// stripped.  An empty string means nothing arrived in time.
    pub fn send_and_read_line(&mut self, command: &str) -> String {
        self.send(command);
        let mut line = self.read_text(b'\n');
        // The board follows '\n' with one more terminator byte.
        let _ = self.transport.read_byte();
        line.truncate(line.trim_end_matches(['\r', '\n']).len());
        debug!("Read - {}", line);
        line
    }

    fn write_line(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.transport
            .write(data)
            .map_err(|_| TransportError::WriteFailed)?;
        self.transport
            .write(b"\n")
            .map_err(|_| TransportError::WriteFailed)?;
        self.transport
            .flush()
            .map_err(|_| TransportError::FlushFailed)
    }

    fn read_text(&mut self, delimiter: u8) -> String {
        match self
            .transport
            .read_until(delimiter, self.timing.field_timeout_ms)
        {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!("{}: {:?}", TransportError::ReadFailed, e);
                String::new()
            }
        }
    }

    /// Borrow the underlying transport (tests and diagnostics).
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

/// A full-state response is read straight off the wire, one
/// comma-delimited field per bounded read.
impl<T, C, D> FieldSource for CommandChannel<T, C, D>
where
    T: Transport,
    C: Clock,
    D: DelayNs,
{
    fn next_field(&mut self) -> String {
        self.read_text(b',')
    }
}

//! Application service — the spa driver core.
//!
//! [`SpaInterface`] owns the command channel, frame decoder, register
//! model and poll scheduler.  It exposes a hardware-agnostic API; all I/O
//! flows through the port traits it is constructed with, so the whole
//! driver is testable with mock adapters.
//!
//! ```text
//!  host loop ──tick()──▶ ┌────────────────────────────┐ ──▶ UpdateObserver
//!                        │        SpaInterface         │
//!  setters ─────────────▶│ Scheduler · Decoder · Model │
//!                        └─────────────┬──────────────┘
//!                                      ▼
//!                        CommandChannel ──▶ Transport
//! ```
//!
//! Everything runs on the caller's thread.  Channel waits are bounded, so
//! `tick()` and the setters always return.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::config::DriverConfig;
use crate::error::{Result, WriteError};
use crate::protocol::channel::{ChannelTiming, CommandChannel};
use crate::protocol::frame::FrameDecoder;
use crate::registers::values::{code_for_label, HeatPumpMode, Tenths};
use crate::registers::{RegisterModel, Registers};
use crate::scheduler::{PollCadence, PollScheduler, PollState};

use super::commands::{self, WriteRegister};
use super::ports::{Clock, Transport, UpdateObserver};

/// Command requesting the full register dump.
pub const READ_ALL_COMMAND: &str = "RF";

// ───────────────────────────────────────────────────────────────
// SpaInterface
// ───────────────────────────────────────────────────────────────

/// Driver for one spa controller board on one serial link.
pub struct SpaInterface<T, C, D> {
    channel: CommandChannel<T, C, D>,
    decoder: FrameDecoder,
    model: RegisterModel,
    scheduler: PollScheduler,
    observer: Option<Box<dyn UpdateObserver>>,
}

impl<T, C, D> SpaInterface<T, C, D>
where
    T: Transport,
    C: Clock,
    D: DelayNs,
{
    /// Build a driver over `transport`.  Nothing is sent until the first
    /// [`tick`](Self::tick).
    pub fn new(transport: T, clock: C, delay: D, config: DriverConfig) -> Result<Self> {
        config.validate()?;
        info!(
            "SpaNet driver: poll every {} ms, retry {} ms, settle {} ms",
            config.poll_interval_ms, config.retry_interval_ms, config.settle_window_ms
        );
        Ok(Self {
            channel: CommandChannel::new(transport, clock, delay, ChannelTiming::from(&config)),
            decoder: FrameDecoder::new(config.frame_min_fields),
            model: RegisterModel::new(),
            scheduler: PollScheduler::new(PollCadence::from(&config)),
            observer: None,
        })
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Advance the scheduler; issues a full-state read when one is due.
    ///
    /// A write since the last tick pushes the next read into the settle
    /// window instead.
    pub fn tick(&mut self) {
        let now = self.channel.now_ms();
        let dirty = self.channel.take_dirty();
        if self.scheduler.tick(now, dirty) {
            // Failures are logged and rescheduled; the cache stays as is.
            let _ = self.update_status();
        }
    }

    /// Read, validate and commit the board's full state now.
    ///
    /// On success the model is replaced atomically and the update
    /// observer runs.  On failure the cached registers are untouched,
    /// `validated` drops and the next read uses the retry cadence.
    pub fn update_status(&mut self) -> Result<()> {
        self.channel.send(READ_ALL_COMMAND);
        let outcome = self.decoder.decode(&mut self.channel);
        self.channel.discard_pending();
        // The read itself is not a state-changing write.
        self.channel.take_dirty();

        let now = self.channel.now_ms();
        match outcome {
            Ok(frame) => {
                self.model.commit(&frame);
                self.scheduler.record_success(now);
                if let Some(observer) = self.observer.as_mut() {
                    observer.on_update();
                }
                Ok(())
            }
            Err(e) => {
                self.model.invalidate();
                self.scheduler.record_failure(now);
                Err(e.into())
            }
        }
    }

    // ── Setters ───────────────────────────────────────────────

    /// Set the operating mode of pump `pump` (1–5).
    pub fn set_pump_mode(&mut self, pump: usize, mode: i32) -> Result<()> {
        let register = commands::pump_mode(pump).ok_or(WriteError::InvalidTarget)?;
        self.write_register(register, mode)?;
        self.model.registers_mut().pumps[pump - 1].mode = Some(mode);
        Ok(())
    }

    /// Set the heater element boost (`HELE`).
    pub fn set_element_boost(&mut self, value: i32) -> Result<()> {
        self.write_register(&commands::ELEMENT_BOOST, value)?;
        self.model.registers_mut().options.element_boost = Some(value);
        Ok(())
    }

    /// Set the water set-point (`STMP`) in tenths of a degree.
    pub fn set_temperature(&mut self, tenths: i32) -> Result<()> {
        self.write_register(&commands::SET_TEMPERATURE, tenths)?;
        self.model.registers_mut().settings.set_temperature = Some(Tenths(tenths));
        Ok(())
    }

    /// Set the heat-pump mode (`HPMP`) by code.  A code with no known
    /// mode sends nothing.
    pub fn set_heat_pump_mode(&mut self, code: i32) -> Result<()> {
        let Some(mode) = HeatPumpMode::from_code(code) else {
            warn!("Unknown heat-pump mode code {}", code);
            return Err(WriteError::InvalidTarget.into());
        };
        self.write_register(&commands::HEAT_PUMP_MODE, code)?;
        self.model.registers_mut().options.heat_pump_mode = Some(mode);
        Ok(())
    }

    /// Set the heat-pump mode by label (`"Auto"`, `"Heat"`, `"Cool"`,
    /// `"Off"`).  An unknown label sends nothing.
    pub fn set_heat_pump_mode_label(&mut self, label: &str) -> Result<()> {
        let Some(code) = code_for_label(&HeatPumpMode::LABELS, label) else {
            warn!("Unknown heat-pump mode {:?}", label);
            return Err(WriteError::UnknownLabel.into());
        };
        self.set_heat_pump_mode(code)
    }

    fn write_register(&mut self, register: &WriteRegister, value: i32) -> Result<()> {
        let command = register.command(value);
        debug!("Write {}", command);
        let ack = self.channel.send_and_read_line(&command);
        if ack.is_empty() {
            warn!("{}: no acknowledgement", command);
            return Err(WriteError::NoAck.into());
        }
        if !register.accepts(&ack, value) {
            warn!("{}: rejected, ack {:?}", command, ack);
            return Err(WriteError::Rejected.into());
        }
        Ok(())
    }

    // ── Change notification ───────────────────────────────────

    /// Register the single observer called after each successful decode,
    /// replacing any previous one.
    pub fn set_update_callback(&mut self, observer: impl UpdateObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_update_callback(&mut self) {
        self.observer = None;
    }

    // ── Queries ───────────────────────────────────────────────

    /// Cached board state.  Unknown properties are `None`.
    pub fn registers(&self) -> &Registers {
        self.model.registers()
    }

    /// True once any frame has validated since start-up.
    pub fn is_initialized(&self) -> bool {
        self.scheduler.is_initialised()
    }

    /// Whether the most recent full read passed its structural checks.
    pub fn is_validated(&self) -> bool {
        self.model.is_validated()
    }

    /// Comma-joined text of the last scanned status response.
    pub fn raw_status(&self) -> &str {
        self.decoder.raw_text()
    }

    /// JSON snapshot of the cached registers.
    pub fn to_json(&self) -> serde_json::Result<String> {
        self.model.to_json()
    }

    /// Monotonic time at which the next full read is due.
    pub fn next_poll_due_ms(&self) -> u64 {
        self.scheduler.next_due_ms()
    }

    pub fn poll_state(&self) -> PollState {
        self.scheduler.state()
    }

    /// Whether a write has been issued since the last tick.
    pub fn is_dirty(&self) -> bool {
        self.channel.is_dirty()
    }

    /// Borrow the transport (diagnostics and tests).
    pub fn transport(&self) -> &T {
        self.channel.transport()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

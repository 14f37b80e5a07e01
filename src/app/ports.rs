//! Port traits — the hexagonal boundary between the protocol core and the
//! platform.
//!
//! ```text
//!   UART adapter ──▶ Transport ──▶ CommandChannel ──▶ SpaInterface
//!   Timer adapter ─▶ Clock     ──┘                         │
//!                                       UpdateObserver ◀───┘
//! ```
//!
//! The core only depends on these narrow contracts; concrete adapters
//! live in [`crate::adapters`] and in the integration-test mocks.

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: core ↔ serial link)
// ───────────────────────────────────────────────────────────────

/// Byte-oriented, half-duplex serial channel to the spa board.
///
/// Reads are bounded: no method may block indefinitely.  The core
/// tolerates truncated or delayed delivery, so implementations need no
/// buffering beyond the platform's receive FIFO.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Block until buffered output has physically left the device.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Number of received bytes waiting to be read.
    fn available(&self) -> usize;

    /// Read a single byte if one is immediately available.
    fn read_byte(&mut self) -> Option<u8>;

    /// Accumulate bytes until `delimiter` is seen or `max_wait_ms`
    /// elapses.  The delimiter is consumed but not returned.  On timeout,
    /// whatever was accumulated is returned (possibly empty).
    fn read_until(&mut self, delimiter: u8, max_wait_ms: u32) -> Result<Vec<u8>, Self::Error>;
}

/// A null transport that discards all writes and never reads.
/// Every exchange over it times out, which exercises the failure paths.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn available(&self) -> usize {
        0
    }

    fn read_byte(&mut self) -> Option<u8> {
        None
    }

    fn read_until(&mut self, _delimiter: u8, _max_wait_ms: u32) -> Result<Vec<u8>, ()> {
        Ok(Vec::new())
    }
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: core ← monotonic timer)
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock used for poll deadlines and bounded waits.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.  Never decreases.
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Update observer (driving adapter: core → external consumer)
// ───────────────────────────────────────────────────────────────

/// Single-slot change notification, invoked synchronously on the
/// scheduler's thread after every successful full decode.
///
/// Any `FnMut()` closure is an observer, so consumers usually register a
/// closure via [`SpaInterface::set_update_callback`](crate::app::service::SpaInterface::set_update_callback).
pub trait UpdateObserver {
    fn on_update(&mut self);
}

impl<F: FnMut()> UpdateObserver for F {
    fn on_update(&mut self) {
        self()
    }
}

//! UART transport to the spa controller board.
//!
//! Drives UART2 through raw ESP-IDF sys calls: 8N1 at the configured baud
//! rate, no flow control, with a receive ring buffer owned by the driver.
//! Reads take a FreeRTOS tick timeout, and a delimited read shares one
//! deadline across all of its bytes, so every call here is bounded.
//!
//! On the host only the bounded-read helper compiles; driver tests use
//! scripted mocks of [`Transport`](crate::app::ports::Transport).

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use crate::adapters::time::MonotonicClock;
#[cfg(target_os = "espidf")]
use crate::app::ports::Clock;

// ── Error type ────────────────────────────────────────────────

/// Errors while bringing the UART up or moving bytes over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UartError {
    ParamConfigFailed(i32),
    SetPinFailed(i32),
    DriverInstallFailed(i32),
    WriteFailed,
    TxDoneTimeout(i32),
    ReadFailed,
}

impl core::fmt::Display for UartError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ParamConfigFailed(rc) => write!(f, "UART param config failed (rc={})", rc),
            Self::SetPinFailed(rc) => write!(f, "UART pin routing failed (rc={})", rc),
            Self::DriverInstallFailed(rc) => write!(f, "UART driver install failed (rc={})", rc),
            Self::WriteFailed => write!(f, "UART write failed"),
            Self::TxDoneTimeout(rc) => write!(f, "UART TX drain timed out (rc={})", rc),
            Self::ReadFailed => write!(f, "UART read failed"),
        }
    }
}

impl std::error::Error for UartError {}

/// Driver receive ring size (bytes).
pub const RX_BUFFER_SIZE: i32 = 1024;

/// Upper bound on waiting for the TX FIFO to drain.
#[cfg(target_os = "espidf")]
const TX_DONE_TIMEOUT_MS: u32 = 100;

#[cfg(target_os = "espidf")]
fn ms_to_ticks(ms: u32) -> TickType_t {
    let ticks = u64::from(ms) * u64::from(configTICK_RATE_HZ) / 1_000;
    // Never round a non-zero wait down to a poll.
    ticks.max(u64::from(ms > 0)) as TickType_t
}

/// Collect bytes up to `delimiter` within one overall `max_wait_ms`
/// budget, keeping at most `cap` bytes.  `read` is handed the wait left
/// before the deadline; the delimiter itself is consumed, not returned.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
fn read_bounded<E>(
    mut read: impl FnMut(u32) -> Result<Option<u8>, E>,
    now_ms: impl Fn() -> u64,
    delimiter: u8,
    max_wait_ms: u32,
    cap: usize,
) -> Result<Vec<u8>, E> {
    let deadline = now_ms() + u64::from(max_wait_ms);
    let mut out = Vec::new();
    while out.len() < cap {
        let remaining = deadline.saturating_sub(now_ms());
        if remaining == 0 {
            break;
        }
        match read(remaining as u32)? {
            Some(b) if b == delimiter => break,
            Some(b) => out.push(b),
            None => break,
        }
    }
    if out.len() >= cap {
        log::warn!("uart: field hit {} bytes without a delimiter", cap);
    }
    Ok(out)
}

// ── Transport ─────────────────────────────────────────────────

/// Installed UART port implementing the driver's transport port.
#[cfg(target_os = "espidf")]
pub struct UartTransport {
    port: uart_port_t,
    clock: MonotonicClock,
}

#[cfg(target_os = "espidf")]
impl UartTransport {
    /// Configure `port` for `baud_rate` 8N1 on the given pins and install
    /// the driver.  Called once from `main()` before the driver starts.
    pub fn install(port: uart_port_t, baud_rate: u32, tx_gpio: i32, rx_gpio: i32) -> Result<Self, UartError> {
        let cfg = uart_config_t {
            baud_rate: baud_rate as i32,
            data_bits: uart_word_length_t_UART_DATA_8_BITS,
            parity: uart_parity_t_UART_PARITY_DISABLE,
            stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
            flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
            ..Default::default()
        };

        // SAFETY: single-threaded init path; `cfg` outlives the call.
        let ret = unsafe { uart_param_config(port, &cfg) };
        if ret != ESP_OK as i32 { return Err(UartError::ParamConfigFailed(ret)); }

        let ret = unsafe { uart_set_pin(port, tx_gpio, rx_gpio, UART_PIN_NO_CHANGE, UART_PIN_NO_CHANGE) };
        if ret != ESP_OK as i32 { return Err(UartError::SetPinFailed(ret)); }

        // RX ring only; writes block until they fit in the hardware FIFO.
        let ret = unsafe {
            uart_driver_install(port, RX_BUFFER_SIZE, 0, 0, core::ptr::null_mut(), 0)
        };
        if ret != ESP_OK as i32 { return Err(UartError::DriverInstallFailed(ret)); }

        log::info!(
            "uart: port {} at {} baud (TX GPIO{}, RX GPIO{})",
            port, baud_rate, tx_gpio, rx_gpio
        );
        Ok(Self { port, clock: MonotonicClock::new() })
    }

}

/// Read one byte from an installed `port`, waiting at most `timeout_ms`.
#[cfg(target_os = "espidf")]
fn read_byte_from(port: uart_port_t, timeout_ms: u32) -> Result<Option<u8>, UartError> {
    let mut byte = 0u8;
    // SAFETY: driver installed in `install`; buffer is one valid byte.
    let n = unsafe {
        uart_read_bytes(port, (&raw mut byte).cast(), 1, ms_to_ticks(timeout_ms))
    };
    match n {
        1 => Ok(Some(byte)),
        0 => Ok(None),
        _ => Err(UartError::ReadFailed),
    }
}

#[cfg(target_os = "espidf")]
impl crate::app::ports::Transport for UartTransport {
    type Error = UartError;

    fn write(&mut self, data: &[u8]) -> Result<usize, UartError> {
        if data.is_empty() {
            return Ok(0);
        }
        // SAFETY: `data` is valid for `data.len()` bytes for the call.
        let n = unsafe { uart_write_bytes(self.port, data.as_ptr().cast(), data.len()) };
        usize::try_from(n).map_err(|_| UartError::WriteFailed)
    }

    fn flush(&mut self) -> Result<(), UartError> {
        let ret = unsafe { uart_wait_tx_done(self.port, ms_to_ticks(TX_DONE_TIMEOUT_MS)) };
        if ret != ESP_OK as i32 { return Err(UartError::TxDoneTimeout(ret)); }
        Ok(())
    }

    fn available(&self) -> usize {
        let mut len: usize = 0;
        let ret = unsafe { uart_get_buffered_data_len(self.port, &mut len) };
        if ret != ESP_OK as i32 { 0 } else { len }
    }

    fn read_byte(&mut self) -> Option<u8> {
        read_byte_from(self.port, 0).ok().flatten()
    }

    fn read_until(&mut self, delimiter: u8, max_wait_ms: u32) -> Result<Vec<u8>, UartError> {
        let port = self.port;
        let clock = &self.clock;
        read_bounded(
            |wait_ms| read_byte_from(port, wait_ms),
            || clock.now_ms(),
            delimiter,
            max_wait_ms,
            RX_BUFFER_SIZE as usize,
        )
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

//! SpaNet Interface Firmware — Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  UartTransport      MonotonicClock      BlockingDelay    │
//! │  (Transport)        (Clock)             (DelayNs)        │
//! │                                                          │
//! │  ──────────────── Port Trait Boundary ────────────────   │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │            SpaInterface (pure logic)               │  │
//! │  │  PollScheduler · FrameDecoder · RegisterModel      │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use log::{error, info};

use spanet::adapters::time::{BlockingDelay, MonotonicClock};
use spanet::adapters::uart::UartTransport;
use spanet::pins;
use spanet::{DriverConfig, SpaInterface};

/// Main-loop pacing between scheduler ticks.
const LOOP_DELAY_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SpaNet Interface v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Serial link ────────────────────────────────────────
    let config = DriverConfig::default();
    let uart = match UartTransport::install(
        pins::SPA_UART_PORT,
        config.baud_rate,
        pins::SPA_UART_TX_GPIO,
        pins::SPA_UART_RX_GPIO,
    ) {
        Ok(u) => u,
        Err(e) => {
            // Nothing to drive without the link; the watchdog resets us.
            error!("UART init failed: {} — halting", e);
            #[allow(clippy::empty_loop)]
            loop {}
        }
    };

    // ── 3. Driver ─────────────────────────────────────────────
    let mut spa = SpaInterface::new(uart, MonotonicClock::new(), BlockingDelay, config)?;

    let updated = Rc::new(Cell::new(false));
    let flag = updated.clone();
    spa.set_update_callback(move || flag.set(true));

    // ── 4. Main loop ──────────────────────────────────────────
    info!("Entering main loop");
    loop {
        spa.tick();

        if updated.replace(false) {
            let r = spa.registers();
            info!(
                "Spa updated: water {} / set {}, heater {:?}, pumps {:?}",
                r.touch_pad.water_temperature.map(|t| t.to_string()).unwrap_or_default(),
                r.settings.set_temperature.map(|t| t.to_string()).unwrap_or_default(),
                r.touch_pad.heater,
                r.pumps.iter().map(|p| p.mode).collect::<Vec<_>>(),
            );
        }

        esp_idf_hal::delay::FreeRtos::delay_ms(LOOP_DELAY_MS);
    }
}

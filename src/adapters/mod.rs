//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter | Implements        | Connects to                     |
//! |---------|-------------------|---------------------------------|
//! | `time`  | Clock, DelayNs    | ESP32 system timer / FreeRTOS   |
//! | `uart`  | Transport         | ESP32 UART2 (espidf only)       |

pub mod time;
pub mod uart;

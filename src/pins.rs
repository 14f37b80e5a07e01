//! GPIO / peripheral assignments for the spa link.
//!
//! Single source of truth; the firmware entry point wires the UART from
//! these constants.

// ---------------------------------------------------------------------------
// Spa controller serial link (UART2, 3.3 V level-shifted)
// ---------------------------------------------------------------------------

/// UART peripheral number used for the spa link.
pub const SPA_UART_PORT: i32 = 2;
/// Receive line from the board's TX.
pub const SPA_UART_RX_GPIO: i32 = 16;
/// Transmit line to the board's RX.
pub const SPA_UART_TX_GPIO: i32 = 17;

//! Serial line protocol spoken by the spa controller board.
//!
//! ```text
//!  CommandChannel ──fields──▶ FrameDecoder ──RawFrame──▶ RegisterModel
//!   (transport I/O)            (framing checks)           (typed decode)
//!                                  │
//!                              MarkerTable
//! ```

pub mod channel;
pub mod frame;
pub mod markers;

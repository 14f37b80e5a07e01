//! SpaNet serial driver library.
//!
//! Exposes the protocol core and register model for the firmware binary,
//! integration tests and fuzzing. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod protocol;
pub mod registers;
pub mod scheduler;

pub mod adapters;
pub mod pins;

pub use app::service::SpaInterface;
pub use config::DriverConfig;
pub use error::{Error, Result};

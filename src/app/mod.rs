//! Application core — the spa driver service and its port boundary.
//!
//! [`service::SpaInterface`] ties the command channel, frame decoder,
//! register model and poll scheduler together.  All interaction with the
//! serial link and the clock happens through the **port traits** defined
//! in [`ports`], keeping this layer fully testable without real hardware.

pub mod commands;
pub mod ports;
pub mod service;

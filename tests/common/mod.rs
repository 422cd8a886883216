//! Shared helpers for integration tests: a signing device with a self-signed
//! certificate and a builder for signed log messages.

#![allow(dead_code)]

pub mod device;
pub mod message;

pub use device::TestDevice;
pub use message::{LogMessageBuilder, Time};

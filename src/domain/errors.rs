//! Structured error types for netscope
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Only startup-time failures live here; per-packet and per-connection
//! failures are recovered locally and never become error values.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("no usable capture interface found (need an up, non-loopback interface with an IPv4 address)")]
    NoInterface,

    #[error("interface {0} not found")]
    InterfaceNotFound(String),

    #[error("interface {0} does not provide an Ethernet channel")]
    UnsupportedChannel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("interface {0} has no MAC address to probe from")]
    NoMacAddress(String),

    #[error("interface {0} does not provide an Ethernet channel")]
    UnsupportedChannel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

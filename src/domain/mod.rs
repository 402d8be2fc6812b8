//! Domain model for netscope
//!
//! This module contains core domain types and errors that provide:
//! - The wire-facing event and host records
//! - Shared pipeline configuration
//! - Structured error handling

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{EventIdGen, HostInfo, PacketEvent, PipelineConfig, Protocol, SENSITIVE_CAPTURE_LIMIT};

pub use errors::{CaptureError, ScanError};

//! Core domain types for the capture pipeline.
//!
//! Everything that crosses a module boundary lives here: the classified
//! packet event sent to viewers, the closed protocol tag set, the shared
//! pipeline configuration, and the monotonic event id source.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Maximum characters of payload captured into [`PacketEvent::sensitive_data`].
pub const SENSITIVE_CAPTURE_LIMIT: usize = 500;

/// Protocol tag assigned by the classifier.
///
/// Closed set, serialized uppercase to match the wire contract
/// (`"DNS"`, `"HTTP"`, `"TCP"`, `"UDP"`, `"OTHER"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Dns,
    Http,
    Tcp,
    Udp,
    Other,
}

/// One classified packet, as delivered to every connected viewer.
///
/// Immutable once built. `details` can be large (full layer dump); events
/// are shared between connections behind an `Arc` rather than cloned.
#[derive(Debug, Clone, Serialize)]
pub struct PacketEvent {
    /// Process-wide monotonic id, unique for the process lifetime.
    pub id: u64,
    /// Local capture time, `%H:%M:%S`.
    pub timestamp: String,
    /// Network-layer source address.
    pub source: String,
    /// Network-layer destination address.
    pub destination: String,
    pub protocol: Protocol,
    /// Total wire length of the captured frame in bytes.
    pub length: usize,
    /// One-line human-readable summary.
    pub info: String,
    /// Full layer-by-layer textual dump.
    pub details: String,
    /// Heuristic credential/form-data flag.
    pub is_sensitive: bool,
    /// Payload excerpt (at most [`SENSITIVE_CAPTURE_LIMIT`] chars) when
    /// flagged, empty otherwise.
    pub sensitive_data: String,
}

/// One host discovered by the ARP sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostInfo {
    pub ip: String,
    pub mac: String,
}

/// Monotonic event id source.
///
/// Wall-clock-derived ids can collide under same-millisecond bursts; a
/// counter cannot.
#[derive(Debug, Default)]
pub struct EventIdGen {
    next: AtomicU64,
}

impl EventIdGen {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next id. Never repeats within the process lifetime.
    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// Shared pipeline configuration, injected into both the capture thread and
/// the connection-serving runtime.
///
/// The only cross-context mutable scalar in the system: the inter-packet
/// throttle delay. Stored as whole milliseconds in a single atomic, so the
/// capture loop's once-per-frame read needs no lock. Last writer wins;
/// a new value takes effect on the next frame processed.
#[derive(Debug, Default)]
pub struct PipelineConfig {
    delay_ms: AtomicU64,
}

impl PipelineConfig {
    /// Create a configuration with an initial throttle delay in seconds.
    /// Invalid input (negative, NaN, infinite) starts the delay at zero.
    #[must_use]
    pub fn new(initial_delay_secs: f64) -> Self {
        let config = Self::default();
        config.set_delay(initial_delay_secs);
        config
    }

    /// Replace the throttle delay. Returns `false` and leaves the value
    /// unchanged if `secs` is not a finite non-negative number.
    pub fn set_delay(&self, secs: f64) -> bool {
        if !secs.is_finite() || secs < 0.0 {
            return false;
        }
        // `as` saturates on overflow, which is fine for a throttle knob.
        self.delay_ms.store((secs * 1000.0).round() as u64, Ordering::Relaxed);
        true
    }

    /// Current inter-packet throttle delay.
    pub fn packet_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms.load(Ordering::Relaxed))
    }
}

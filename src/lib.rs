//! # netscope - Live Capture / Classify / Broadcast Backend
//!
//! netscope captures live traffic on a host interface, classifies each
//! packet by protocol, heuristically flags probable credential or form
//! traffic, and streams a structured JSON event per packet to any number of
//! connected WebSocket viewers. A companion endpoint runs an active ARP
//! sweep of the local /24 to enumerate reachable hosts.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────────────────┐
//! │   Capture thread (pnet)   │  blocking datalink reads, one frame
//! │   capture::capture_loop   │  at a time, throttled by the shared
//! └────────────┬──────────────┘  PipelineConfig delay
//!              │ classify::classify → PacketEvent
//!              ▼
//!      unbounded mpsc channel      (the only cross-context handoff)
//!              │
//! ┌────────────▼──────────────┐
//! │   Serving runtime (tokio) │  forwarder task drains the channel
//! │   broadcast::Broadcaster  │  and publishes to a snapshot of the
//! └────────────┬──────────────┘  connection registry, best effort
//!              │ one unbounded channel per viewer
//!              ▼
//!      server::/ws connections    outbound: JSON events
//!                                 inbound:  {"delay": n} control frames
//! ```
//!
//! ## Module Structure
//!
//! - [`capture`]: blocking capture loop on a dedicated thread
//! - [`classify`]: pure frame → event classifier (DNS/HTTP/TCP/UDP/OTHER,
//!   plaintext credential heuristic, layer dump)
//! - [`broadcast`]: connection registry and at-most-once fan-out
//! - [`scan`]: one-shot ARP discovery sweep
//! - [`server`]: axum router for `/scan` and `/ws`
//! - [`domain`]: event/host records, shared pipeline configuration, errors
//! - [`cli`]: command-line argument parsing
//!
//! ## Delivery Semantics
//!
//! Broadcast is explicitly best-effort: a viewer that registers after an
//! event's registry snapshot misses that event, a viewer whose connection
//! fails is dropped at the next delivery attempt, and nothing is buffered
//! for replay. Per-viewer ordering is FIFO; nothing is persisted anywhere.

// Expose modules for testing
pub mod broadcast;
pub mod capture;
pub mod classify;
pub mod cli;
pub mod domain;
pub mod scan;
pub mod server;

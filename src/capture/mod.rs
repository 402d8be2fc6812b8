//! Live packet capture.
//!
//! The capture loop is a blocking, unbounded-duration operation and runs on
//! its own OS thread, never on the async runtime. It owns nothing shared
//! except the injected [`PipelineConfig`] (one atomic read per frame) and
//! the sending half of the event channel; classified events cross to the
//! serving runtime through that channel alone.

use crate::classify;
use crate::domain::{CaptureError, EventIdGen, PacketEvent, PipelineConfig};
use log::{info, warn};
use pnet::datalink::{self, Channel, DataLinkReceiver, NetworkInterface};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Pick the capture interface.
///
/// With an explicit name, that interface must exist. Otherwise the first
/// up, non-loopback interface with an IPv4 address is used.
pub fn resolve_interface(name: Option<&str>) -> Result<NetworkInterface, CaptureError> {
    let interfaces = datalink::interfaces();
    match name {
        Some(name) => interfaces
            .into_iter()
            .find(|iface| iface.name == name)
            .ok_or_else(|| CaptureError::InterfaceNotFound(name.to_string())),
        None => interfaces
            .into_iter()
            .find(|iface| {
                iface.is_up()
                    && !iface.is_loopback()
                    && iface.ips.iter().any(|ip| ip.is_ipv4())
            })
            .ok_or(CaptureError::NoInterface),
    }
}

/// Open a promiscuous Ethernet channel on `interface`.
///
/// Failing to open the capture interface is the one fatal startup error in
/// the system, so this happens before the capture thread is spawned.
pub fn open_channel(interface: &NetworkInterface) -> Result<Box<dyn DataLinkReceiver>, CaptureError> {
    let config = datalink::Config {
        promiscuous: true,
        ..datalink::Config::default()
    };
    match datalink::channel(interface, config) {
        Ok(Channel::Ethernet(_tx, rx)) => Ok(rx),
        Ok(_) => Err(CaptureError::UnsupportedChannel(interface.name.clone())),
        Err(e) => Err(CaptureError::Io(e)),
    }
}

/// Run the capture loop until the receiving side of `events` is gone.
///
/// Per frame: read the throttle delay and sleep it off if nonzero, classify,
/// and send the event across. Frames are never buffered beyond the one
/// being processed. Read errors are logged and the loop keeps going.
pub fn capture_loop(
    mut rx: Box<dyn DataLinkReceiver>,
    config: Arc<PipelineConfig>,
    ids: Arc<EventIdGen>,
    events: UnboundedSender<PacketEvent>,
) {
    info!("beginning packet capture");
    loop {
        match rx.next() {
            Ok(frame) => {
                // Viewer-adjustable throttle, read once per frame.
                let delay = config.packet_delay();
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                let Some(event) = classify::classify(frame, &ids) else {
                    continue;
                };
                if events.send(event).is_err() {
                    info!("event channel closed, stopping capture");
                    return;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => {
                warn!("capture read error: {e}");
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }
}

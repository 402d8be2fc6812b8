//! Active host discovery: one-shot ARP sweep of the local /24.
//!
//! Broadcasts one ARP request per address in the subnet, then collects
//! replies until the timeout window closes. Hosts that stay silent are
//! simply absent from the result; an empty result is a valid outcome, not
//! an error. The whole operation blocks and is expected to run under
//! `spawn_blocking` when called from the serving runtime.

use crate::domain::{HostInfo, ScanError};
use log::{info, warn};
use pnet::datalink::{self, Channel, NetworkInterface};
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet::packet::{MutablePacket, Packet};
use pnet::util::MacAddr;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

/// Reply collection window.
pub const SCAN_TIMEOUT: Duration = Duration::from_secs(2);

const ETHERNET_HEADER_LEN: usize = 14;
const ARP_PACKET_LEN: usize = 28;

/// Sweep the interface's /24 and return every host that answered.
///
/// The subnet comes from [`local_ipv4`]; results are deduplicated and
/// sorted by address (callers must not rely on any particular order).
pub fn discover_hosts(
    interface: &NetworkInterface,
    timeout: Duration,
) -> Result<Vec<HostInfo>, ScanError> {
    let source_mac = interface
        .mac
        .ok_or_else(|| ScanError::NoMacAddress(interface.name.clone()))?;
    let source_ip = local_ipv4(interface);
    let [a, b, c, _] = source_ip.octets();
    info!("scanning target: {a}.{b}.{c}.0/24");

    let config = datalink::Config {
        read_timeout: Some(Duration::from_millis(100)),
        ..datalink::Config::default()
    };
    let (mut tx, mut rx) = match datalink::channel(interface, config) {
        Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
        Ok(_) => return Err(ScanError::UnsupportedChannel(interface.name.clone())),
        Err(e) => return Err(ScanError::Io(e)),
    };

    let mut frame = [0u8; ETHERNET_HEADER_LEN + ARP_PACKET_LEN];
    for host in 1..=254u8 {
        let target = Ipv4Addr::new(a, b, c, host);
        if target == source_ip {
            continue;
        }
        if build_arp_request(&mut frame, source_mac, source_ip, target).is_some() {
            if let Some(Err(e)) = tx.send_to(&frame, None) {
                warn!("failed to send ARP probe to {target}: {e}");
            }
        }
    }

    let mut hosts: BTreeMap<Ipv4Addr, MacAddr> = BTreeMap::new();
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        match rx.next() {
            Ok(reply) => collect_reply(&mut hosts, reply),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => {
                warn!("scan read error: {e}");
                break;
            }
        }
    }

    Ok(host_list(hosts))
}

/// Fold one received frame into the reply set. Non-reply frames are
/// ignored; a host that answers more than once overwrites its own entry,
/// so repeats cannot inflate the result.
fn collect_reply(hosts: &mut BTreeMap<Ipv4Addr, MacAddr>, frame: &[u8]) {
    if let Some((ip, mac)) = parse_arp_reply(frame) {
        hosts.insert(ip, mac);
    }
}

/// Render the collected reply set in wire form, sorted by address.
fn host_list(hosts: BTreeMap<Ipv4Addr, MacAddr>) -> Vec<HostInfo> {
    hosts
        .into_iter()
        .map(|(ip, mac)| HostInfo {
            ip: ip.to_string(),
            mac: mac.to_string(),
        })
        .collect()
}

/// Determine the operator's local IPv4 address.
///
/// Connects a throwaway UDP socket to a well-known external address and
/// reads back the source address the OS picked; no traffic is sent.
/// Falls back to the interface's own address, then to 192.168.1.1.
fn local_ipv4(interface: &NetworkInterface) -> Ipv4Addr {
    if let Ok(socket) = UdpSocket::bind(("0.0.0.0", 0)) {
        if socket.connect(("8.8.8.8", 80)).is_ok() {
            if let Ok(SocketAddr::V4(addr)) = socket.local_addr() {
                return *addr.ip();
            }
        }
    }
    if let Some(ip) = interface.ips.iter().find_map(|net| match net.ip() {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(_) => None,
    }) {
        return ip;
    }
    warn!("could not determine local address, falling back to 192.168.1.0/24");
    Ipv4Addr::new(192, 168, 1, 1)
}

/// Write a broadcast ARP who-has request for `target_ip` into `buf`.
fn build_arp_request(
    buf: &mut [u8],
    source_mac: MacAddr,
    source_ip: Ipv4Addr,
    target_ip: Ipv4Addr,
) -> Option<()> {
    let mut ethernet = MutableEthernetPacket::new(buf)?;
    ethernet.set_destination(MacAddr::broadcast());
    ethernet.set_source(source_mac);
    ethernet.set_ethertype(EtherTypes::Arp);

    let mut arp = MutableArpPacket::new(ethernet.payload_mut())?;
    arp.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp.set_protocol_type(EtherTypes::Ipv4);
    arp.set_hw_addr_len(6);
    arp.set_proto_addr_len(4);
    arp.set_operation(ArpOperations::Request);
    arp.set_sender_hw_addr(source_mac);
    arp.set_sender_proto_addr(source_ip);
    arp.set_target_hw_addr(MacAddr::zero());
    arp.set_target_proto_addr(target_ip);
    Some(())
}

/// Extract `{sender ip, sender mac}` from an ARP reply frame.
fn parse_arp_reply(frame: &[u8]) -> Option<(Ipv4Addr, MacAddr)> {
    let ethernet = EthernetPacket::new(frame)?;
    if ethernet.get_ethertype() != EtherTypes::Arp {
        return None;
    }
    let arp = ArpPacket::new(ethernet.payload())?;
    if arp.get_operation() != ArpOperations::Reply {
        return None;
    }
    Some((arp.get_sender_proto_addr(), arp.get_sender_hw_addr()))
}

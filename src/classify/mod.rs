//! Frame classification: raw captured frame to structured event.
//!
//! Pure mapping with internally caught decode shortfalls. Ordered,
//! first match wins:
//!
//! 1. Port-53 traffic carrying a DNS query → `DNS`
//! 2. TCP → `TCP`, upgraded to `HTTP` when the payload contains `"HTTP"`
//! 3. UDP → `UDP`
//! 4. Anything else IPv4 → `OTHER`
//!
//! Non-IPv4 frames produce no event at all. Independently of the protocol
//! tag, TCP payloads are checked for plaintext credential/form markers and
//! flagged `is_sensitive` when one matches. The heuristic is intentionally
//! crude substring matching: it trades precision for zero false negatives
//! on common plaintext leakage patterns.

pub mod dns;
pub mod dump;

use crate::domain::{EventIdGen, PacketEvent, Protocol, SENSITIVE_CAPTURE_LIMIT};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::tcp::TcpPacket;
use pnet::packet::udp::UdpPacket;
use pnet::packet::Packet;

pub use dns::DnsQuestion;

/// Maximum characters of the payload's first line kept in HTTP `info`.
pub const HTTP_INFO_LIMIT: usize = 50;

const DNS_PORT: u16 = 53;

/// Payload substrings that mark a packet as probably carrying credentials
/// or a form submission. Matched case-insensitively; `POST` is matched
/// case-sensitively on top of these.
const SENSITIVE_MARKERS: &[&str] = &["pass", "user", "login"];

/// Classify one captured frame.
///
/// Returns `None` for anything that is not IPv4 (ARP, bare Ethernet,
/// IPv6); otherwise exactly one event. Decode failures inside a layer
/// degrade the affected field to a placeholder, never abort classification.
pub fn classify(frame: &[u8], ids: &EventIdGen) -> Option<PacketEvent> {
    let ethernet = EthernetPacket::new(frame)?;
    if ethernet.get_ethertype() != EtherTypes::Ipv4 {
        return None;
    }
    let ipv4 = Ipv4Packet::new(ethernet.payload())?;

    let source = ipv4.get_source().to_string();
    let destination = ipv4.get_destination().to_string();

    let mut protocol = Protocol::Other;
    let mut info = format!(
        "IPv4 {source} > {destination} proto={}",
        ipv4.get_next_level_protocol().0
    );
    let mut is_sensitive = false;
    let mut sensitive_data = String::new();

    if let Some(dns_info) = dns_summary(&ipv4) {
        protocol = Protocol::Dns;
        info = dns_info;
    } else {
        match ipv4.get_next_level_protocol() {
            IpNextHeaderProtocols::Tcp => {
                protocol = Protocol::Tcp;
                if let Some(tcp) = TcpPacket::new(ipv4.payload()) {
                    let payload = tcp.payload();
                    info = format!(
                        "TCP {source}:{} > {destination}:{} len={}",
                        tcp.get_source(),
                        tcp.get_destination(),
                        payload.len()
                    );
                    if !payload.is_empty() {
                        let text = String::from_utf8_lossy(payload);
                        if text.contains("HTTP") {
                            protocol = Protocol::Http;
                            let first_line = text.lines().next().unwrap_or_default();
                            info = format!("HTTP: {}", truncate_chars(first_line, HTTP_INFO_LIMIT));
                        }
                        // Not mutually exclusive with the HTTP upgrade above.
                        if looks_sensitive(&text) {
                            is_sensitive = true;
                            sensitive_data = truncate_chars(&text, SENSITIVE_CAPTURE_LIMIT);
                        }
                    }
                } else {
                    info = "TCP packet".to_string();
                }
            }
            IpNextHeaderProtocols::Udp => {
                protocol = Protocol::Udp;
                if let Some(udp) = UdpPacket::new(ipv4.payload()) {
                    info = format!(
                        "UDP {source}:{} > {destination}:{} len={}",
                        udp.get_source(),
                        udp.get_destination(),
                        udp.get_length()
                    );
                } else {
                    info = "UDP packet".to_string();
                }
            }
            _ => {}
        }
    }

    Some(PacketEvent {
        id: ids.next_id(),
        timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        source,
        destination,
        protocol,
        length: frame.len(),
        info,
        details: dump::render(&ethernet, &ipv4),
        is_sensitive,
        sensitive_data,
    })
}

/// Check a lossily decoded payload for credential/form markers.
fn looks_sensitive(text: &str) -> bool {
    if text.contains("POST") {
        return true;
    }
    let lowered = text.to_lowercase();
    SENSITIVE_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// If the frame is port-53 traffic carrying a DNS query, produce the DNS
/// `info` line. A query whose name cannot be decoded degrades to the bare
/// `"DNS Query"` label; responses fall through to TCP/UDP classification.
fn dns_summary(ipv4: &Ipv4Packet<'_>) -> Option<String> {
    let question = match ipv4.get_next_level_protocol() {
        IpNextHeaderProtocols::Udp => {
            let udp = UdpPacket::new(ipv4.payload())?;
            if udp.get_source() != DNS_PORT && udp.get_destination() != DNS_PORT {
                return None;
            }
            dns::parse_question(udp.payload())?
        }
        IpNextHeaderProtocols::Tcp => {
            let tcp = TcpPacket::new(ipv4.payload())?;
            if tcp.get_source() != DNS_PORT && tcp.get_destination() != DNS_PORT {
                return None;
            }
            // DNS over TCP prefixes the message with a two-byte length;
            // only strip it when it actually frames the rest of the payload.
            let payload = tcp.payload();
            let framed = payload
                .get(..2)
                .map(|prefix| usize::from(u16::from_be_bytes([prefix[0], prefix[1]])))
                .is_some_and(|len| len == payload.len() - 2);
            if framed {
                dns::parse_question(&payload[2..])?
            } else {
                dns::parse_question(payload)?
            }
        }
        _ => return None,
    };
    Some(match question {
        DnsQuestion::Name(name) => format!("DNS Query: {name}"),
        DnsQuestion::Unreadable => "DNS Query".to_string(),
    })
}

/// Truncate to at most `limit` characters, never splitting a char.
fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

//! Textual packet dumps for the event `details` field.
//!
//! Renders the decoded layers of a frame one per line, followed by a hex
//! dump of any transport payload. This is display-only output; viewers get
//! it verbatim.

use pnet::packet::ethernet::EthernetPacket;
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::tcp::TcpPacket;
use pnet::packet::udp::UdpPacket;
use pnet::packet::Packet;
use std::fmt::Write as _;

/// Render the layer-by-layer dump for an IPv4 frame.
///
/// Transport headers that fail to decode produce a placeholder line rather
/// than aborting the dump.
pub fn render(ethernet: &EthernetPacket<'_>, ipv4: &Ipv4Packet<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Ethernet  src={} dst={} type=IPv4",
        ethernet.get_source(),
        ethernet.get_destination()
    );
    let _ = writeln!(
        out,
        "IPv4      src={} dst={} ttl={} proto={} len={}",
        ipv4.get_source(),
        ipv4.get_destination(),
        ipv4.get_ttl(),
        ipv4.get_next_level_protocol().0,
        ipv4.get_total_length()
    );

    match ipv4.get_next_level_protocol() {
        IpNextHeaderProtocols::Tcp => {
            if let Some(tcp) = TcpPacket::new(ipv4.payload()) {
                let _ = writeln!(
                    out,
                    "TCP       sport={} dport={} seq={} ack={} win={}",
                    tcp.get_source(),
                    tcp.get_destination(),
                    tcp.get_sequence(),
                    tcp.get_acknowledgement(),
                    tcp.get_window()
                );
                append_payload(&mut out, tcp.payload());
            } else {
                out.push_str("TCP       (truncated header)\n");
            }
        }
        IpNextHeaderProtocols::Udp => {
            if let Some(udp) = UdpPacket::new(ipv4.payload()) {
                let _ = writeln!(
                    out,
                    "UDP       sport={} dport={} len={}",
                    udp.get_source(),
                    udp.get_destination(),
                    udp.get_length()
                );
                append_payload(&mut out, udp.payload());
            } else {
                out.push_str("UDP       (truncated header)\n");
            }
        }
        other => {
            let _ = writeln!(out, "IP proto {}  (not decoded)", other.0);
        }
    }
    out
}

/// Append a classic offset/hex/ASCII dump of `payload`, 16 bytes per line.
fn append_payload(out: &mut String, payload: &[u8]) {
    if payload.is_empty() {
        return;
    }
    let _ = writeln!(out, "Payload   {} bytes", payload.len());
    for (row, chunk) in payload.chunks(16).enumerate() {
        let mut hex = String::with_capacity(47);
        let mut ascii = String::with_capacity(16);
        for (i, byte) in chunk.iter().enumerate() {
            if i > 0 {
                hex.push(' ');
            }
            let _ = write!(hex, "{byte:02x}");
            ascii.push(if byte.is_ascii_graphic() || *byte == b' ' {
                *byte as char
            } else {
                '.'
            });
        }
        let _ = writeln!(out, "  {:04x}  {hex:<47}  {ascii}", row * 16);
    }
}

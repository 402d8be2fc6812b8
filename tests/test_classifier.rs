//! Classifier behavior over crafted frames.

use netscope::classify::{classify, HTTP_INFO_LIMIT};
use netscope::domain::{EventIdGen, Protocol, SENSITIVE_CAPTURE_LIMIT};
use pnet::packet::ethernet::{EtherTypes, MutableEthernetPacket};
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::MutableIpv4Packet;
use pnet::packet::tcp::MutableTcpPacket;
use pnet::packet::udp::MutableUdpPacket;
use pnet::util::MacAddr;
use std::net::Ipv4Addr;

const ETH_LEN: usize = 14;
const IP_LEN: usize = 20;
const TCP_LEN: usize = 20;
const UDP_LEN: usize = 8;

const SRC_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);
const DST_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 20);

fn ethernet_ipv4(next: IpNextHeaderProtocol, transport_len: usize) -> Vec<u8> {
    let mut frame = vec![0u8; ETH_LEN + IP_LEN + transport_len];
    {
        let mut eth = MutableEthernetPacket::new(&mut frame).unwrap();
        eth.set_source(MacAddr::new(2, 0, 0, 0, 0, 1));
        eth.set_destination(MacAddr::new(2, 0, 0, 0, 0, 2));
        eth.set_ethertype(EtherTypes::Ipv4);
    }
    {
        let mut ip = MutableIpv4Packet::new(&mut frame[ETH_LEN..]).unwrap();
        ip.set_version(4);
        ip.set_header_length(5);
        ip.set_total_length(u16::try_from(IP_LEN + transport_len).unwrap());
        ip.set_ttl(64);
        ip.set_next_level_protocol(next);
        ip.set_source(SRC_IP);
        ip.set_destination(DST_IP);
    }
    frame
}

fn tcp_frame(sport: u16, dport: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = ethernet_ipv4(IpNextHeaderProtocols::Tcp, TCP_LEN + payload.len());
    let mut tcp = MutableTcpPacket::new(&mut frame[ETH_LEN + IP_LEN..]).unwrap();
    tcp.set_source(sport);
    tcp.set_destination(dport);
    tcp.set_data_offset(5);
    tcp.set_payload(payload);
    frame
}

fn udp_frame(sport: u16, dport: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = ethernet_ipv4(IpNextHeaderProtocols::Udp, UDP_LEN + payload.len());
    let mut udp = MutableUdpPacket::new(&mut frame[ETH_LEN + IP_LEN..]).unwrap();
    udp.set_source(sport);
    udp.set_destination(dport);
    udp.set_length(u16::try_from(UDP_LEN + payload.len()).unwrap());
    udp.set_payload(payload);
    frame
}

/// Standard query for `example.com.`, A/IN.
fn dns_query_payload() -> Vec<u8> {
    let mut msg = vec![
        0x12, 0x34, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    msg.extend_from_slice(b"\x07example\x03com\x00");
    msg.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
    msg
}

#[test]
fn non_ip_frames_yield_no_event() {
    let ids = EventIdGen::new();

    let mut arp_frame = vec![0u8; 42];
    {
        let mut eth = MutableEthernetPacket::new(&mut arp_frame).unwrap();
        eth.set_ethertype(EtherTypes::Arp);
    }
    assert!(classify(&arp_frame, &ids).is_none());

    let mut lldp_frame = vec![0u8; 60];
    {
        let mut eth = MutableEthernetPacket::new(&mut lldp_frame).unwrap();
        eth.set_ethertype(EtherTypes::Lldp);
    }
    assert!(classify(&lldp_frame, &ids).is_none());

    // Too short for an Ethernet header at all
    assert!(classify(&[0u8; 6], &ids).is_none());
}

#[test]
fn plain_tcp_is_tagged_tcp() {
    let ids = EventIdGen::new();
    let frame = tcp_frame(50000, 443, b"\x16\x03\x01\x02\x00");
    let event = classify(&frame, &ids).unwrap();

    assert_eq!(event.protocol, Protocol::Tcp);
    assert_eq!(event.source, SRC_IP.to_string());
    assert_eq!(event.destination, DST_IP.to_string());
    assert_eq!(event.length, frame.len());
    assert!(event.info.starts_with("TCP "));
    assert!(!event.is_sensitive);
    assert!(event.sensitive_data.is_empty());
}

#[test]
fn http_payload_upgrades_protocol_and_truncates_info() {
    let ids = EventIdGen::new();
    let long_path = "a".repeat(120);
    let payload = format!("GET /{long_path} HTTP/1.1\r\nHost: example.com\r\n\r\n");
    let event = classify(&tcp_frame(50000, 80, payload.as_bytes()), &ids).unwrap();

    assert_eq!(event.protocol, Protocol::Http);
    assert!(event.info.starts_with("HTTP: GET /"));
    assert_eq!(event.info.chars().count(), "HTTP: ".len() + HTTP_INFO_LIMIT);
}

#[test]
fn http_marker_is_case_sensitive() {
    let ids = EventIdGen::new();
    let event = classify(&tcp_frame(50000, 80, b"get / http/1.1\r\n"), &ids).unwrap();
    assert_eq!(event.protocol, Protocol::Tcp);
}

#[test]
fn credential_payload_is_flagged() {
    let ids = EventIdGen::new();
    let payload = b"GET / HTTP/1.1\r\nPOST data user=admin&pass=1234";
    let event = classify(&tcp_frame(50000, 80, payload), &ids).unwrap();

    assert_eq!(event.protocol, Protocol::Http);
    assert!(event.is_sensitive);
    assert!(event
        .sensitive_data
        .starts_with("GET / HTTP/1.1\r\nPOST data user=admin&pass=1234"));
}

#[test]
fn sensitive_excerpt_is_bounded() {
    let ids = EventIdGen::new();
    let payload = format!("login={}", "x".repeat(2000));
    let event = classify(&tcp_frame(50000, 80, payload.as_bytes()), &ids).unwrap();

    assert!(event.is_sensitive);
    assert_eq!(event.sensitive_data.chars().count(), SENSITIVE_CAPTURE_LIMIT);
}

#[test]
fn invalid_utf8_payload_is_replaced_not_fatal() {
    let ids = EventIdGen::new();
    let mut payload = b"user=".to_vec();
    payload.extend_from_slice(&[0xFF, 0xFE, 0xFD]);
    let event = classify(&tcp_frame(50000, 80, &payload), &ids).unwrap();

    assert!(event.is_sensitive);
    assert!(event.sensitive_data.starts_with("user="));
}

#[test]
fn dns_query_over_udp() {
    let ids = EventIdGen::new();
    let event = classify(&udp_frame(33000, 53, &dns_query_payload()), &ids).unwrap();

    assert_eq!(event.protocol, Protocol::Dns);
    assert_eq!(event.info, "DNS Query: example.com.");
}

#[test]
fn malformed_dns_name_degrades_info() {
    let ids = EventIdGen::new();
    let mut payload = dns_query_payload();
    payload.truncate(16); // cut inside the qname
    let event = classify(&udp_frame(33000, 53, &payload), &ids).unwrap();

    assert_eq!(event.protocol, Protocol::Dns);
    assert_eq!(event.info, "DNS Query");
}

#[test]
fn dns_response_falls_through_to_udp() {
    let ids = EventIdGen::new();
    let mut payload = dns_query_payload();
    payload[2] = 0x81; // QR=1: standard response
    payload[3] = 0x80;
    payload[7] = 0x01; // ancount = 1
    let event = classify(&udp_frame(53, 33000, &payload), &ids).unwrap();

    // Responses echo the question section but are not queries.
    assert_eq!(event.protocol, Protocol::Udp);
    assert!(event.info.starts_with("UDP "));
}

#[test]
fn dns_query_over_tcp_with_length_prefix() {
    let ids = EventIdGen::new();
    let message = dns_query_payload();
    let mut payload = u16::try_from(message.len()).unwrap().to_be_bytes().to_vec();
    payload.extend_from_slice(&message);
    let event = classify(&tcp_frame(33000, 53, &payload), &ids).unwrap();

    assert_eq!(event.protocol, Protocol::Dns);
    assert_eq!(event.info, "DNS Query: example.com.");
}

#[test]
fn dns_response_over_tcp_falls_through_to_tcp() {
    let ids = EventIdGen::new();
    let mut message = dns_query_payload();
    message[2] = 0x81; // QR=1: standard response
    message[3] = 0x80;
    let mut payload = u16::try_from(message.len()).unwrap().to_be_bytes().to_vec();
    payload.extend_from_slice(&message);
    let event = classify(&tcp_frame(53, 33000, &payload), &ids).unwrap();

    assert_eq!(event.protocol, Protocol::Tcp);
}

#[test]
fn port_53_garbage_falls_through_to_udp() {
    let ids = EventIdGen::new();
    let event = classify(&udp_frame(33000, 53, b"hi"), &ids).unwrap();
    assert_eq!(event.protocol, Protocol::Udp);
}

#[test]
fn plain_udp_is_tagged_udp() {
    let ids = EventIdGen::new();
    let event = classify(&udp_frame(5353, 5354, b"payload"), &ids).unwrap();
    assert_eq!(event.protocol, Protocol::Udp);
    assert!(event.info.starts_with("UDP "));
}

#[test]
fn other_ip_protocols_are_tagged_other() {
    let ids = EventIdGen::new();
    let frame = ethernet_ipv4(IpNextHeaderProtocols::Icmp, 8);
    let event = classify(&frame, &ids).unwrap();

    assert_eq!(event.protocol, Protocol::Other);
    assert!(event.info.contains("proto=1"));
}

#[test]
fn event_ids_are_unique_and_increasing() {
    let ids = EventIdGen::new();
    let first = classify(&udp_frame(1, 2, b"a"), &ids).unwrap();
    let second = classify(&udp_frame(1, 2, b"b"), &ids).unwrap();
    assert!(second.id > first.id);
}

#[test]
fn details_dump_contains_each_layer() {
    let ids = EventIdGen::new();
    let event = classify(&tcp_frame(50000, 80, b"GET / HTTP/1.1\r\n"), &ids).unwrap();

    assert!(event.details.contains("Ethernet"));
    assert!(event.details.contains("IPv4"));
    assert!(event.details.contains("TCP"));
    assert!(event.details.contains("Payload"));
}

#[test]
fn event_serializes_with_wire_field_names() {
    let ids = EventIdGen::new();
    let event = classify(&tcp_frame(50000, 80, b"GET / HTTP/1.1\r\n"), &ids).unwrap();
    let json: serde_json::Value = serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();

    assert_eq!(json["protocol"], "HTTP");
    assert_eq!(json["source"], SRC_IP.to_string());
    assert_eq!(json["is_sensitive"], false);
    assert!(json["id"].is_u64());
    assert!(json["details"].is_string());
}

//! Minimal DNS question decoding.
//!
//! The classifier only needs to answer two questions about a port-53
//! payload: is it a DNS query, and if so what is the query name. Anything
//! beyond the first question is ignored.

/// DNS message header length (id, flags, four section counts).
const HEADER_LEN: usize = 12;

/// Outcome of looking at a payload that might be a DNS message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsQuestion {
    /// A question section was present and its name decoded cleanly.
    Name(String),
    /// A question section was present but the name could not be decoded.
    /// The classifier degrades to a generic label instead of failing.
    Unreadable,
}

/// Try to read the first query name out of a DNS query message.
///
/// Returns `None` when the payload is not a DNS query with a question
/// section, letting the caller fall through to plain TCP/UDP
/// classification. Responses echo the question section, so the QR bit is
/// checked as well: only queries classify as DNS.
pub fn parse_question(payload: &[u8]) -> Option<DnsQuestion> {
    if payload.len() < HEADER_LEN {
        return None;
    }
    let flags = u16::from_be_bytes([payload[2], payload[3]]);
    if flags & 0x8000 != 0 {
        return None; // QR set: this is a response
    }
    let qdcount = u16::from_be_bytes([payload[4], payload[5]]);
    if qdcount == 0 {
        return None;
    }
    Some(decode_name(&payload[HEADER_LEN..]).map_or(DnsQuestion::Unreadable, DnsQuestion::Name))
}

/// Decode a label sequence into dotted form with a trailing dot
/// (`example.com.`), the way resolver tooling prints absolute names.
fn decode_name(mut labels: &[u8]) -> Option<String> {
    let mut name = String::new();
    loop {
        let (&len, rest) = labels.split_first()?;
        if len == 0 {
            if name.is_empty() {
                name.push('.'); // root query
            }
            return Some(name);
        }
        // Compression pointers never appear in a well-formed question name.
        if len & 0xC0 != 0 {
            return None;
        }
        let len = usize::from(len);
        if rest.len() < len {
            return None;
        }
        name.push_str(std::str::from_utf8(&rest[..len]).ok()?);
        name.push('.');
        labels = &rest[len..];
    }
}

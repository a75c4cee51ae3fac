use super::ICMPV4_HEADER_LEN;
use pnet_packet::icmp::echo_reply::EchoReplyPacket;
use pnet_packet::icmp::{IcmpPacket, IcmpTypes};
use pnet_packet::ipv4::Ipv4Packet;
use std::net::Ipv4Addr;

const IPV4_MIN_HEADER_LEN: usize = 20;

/// Identifier and sequence of an Echo-Request quoted inside an ICMP error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuotedEcho {
    pub identifier: u16,
    pub sequence: u16,
}

/// Classification of a datagram read from the raw ICMP socket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound<'a> {
    EchoReply {
        source: Ipv4Addr,
        ttl: u8,
        identifier: u16,
        sequence: u16,
        /// The whole ICMP message, header included.
        icmp: &'a [u8],
    },
    DestinationUnreachable {
        source: Ipv4Addr,
        code: u8,
        quoted: Option<QuotedEcho>,
    },
    TimeExceeded {
        source: Ipv4Addr,
        code: u8,
        quoted: Option<QuotedEcho>,
    },
    /// Any other ICMP message, including our own requests looped back.
    Other,
}

/// Returns the IPv4 payload, skipping a header of `IHL * 4` bytes.
fn ipv4_payload(buf: &[u8]) -> Option<(Ipv4Packet<'_>, &[u8])> {
    let ip = Ipv4Packet::new(buf)?;
    if ip.get_version() != 4 {
        return None;
    }
    let header_len = ip.get_header_length() as usize * 4;
    if header_len < IPV4_MIN_HEADER_LEN {
        return None;
    }
    let payload = buf.get(header_len..)?;
    Some((ip, payload))
}

fn quoted_echo(icmp: &[u8]) -> Option<QuotedEcho> {
    let (_, inner) = ipv4_payload(icmp.get(ICMPV4_HEADER_LEN..)?)?;
    let echo = inner.get(..ICMPV4_HEADER_LEN)?;
    if echo[0] != IcmpTypes::EchoRequest.0 {
        return None;
    }
    Some(QuotedEcho {
        identifier: u16::from_be_bytes([echo[4], echo[5]]),
        sequence: u16::from_be_bytes([echo[6], echo[7]]),
    })
}

/// Parses a raw-socket datagram (IPv4 header included). Returns `None` for
/// anything too short or malformed to classify.
pub fn parse_datagram(buf: &[u8]) -> Option<Inbound<'_>> {
    let (ip, icmp) = ipv4_payload(buf)?;
    let header = IcmpPacket::new(icmp)?;
    let source = ip.get_source();
    let inbound = match header.get_icmp_type() {
        IcmpTypes::EchoReply => {
            let echo = EchoReplyPacket::new(icmp)?;
            Inbound::EchoReply {
                source,
                ttl: ip.get_ttl(),
                identifier: echo.get_identifier(),
                sequence: echo.get_sequence_number(),
                icmp,
            }
        }
        IcmpTypes::DestinationUnreachable => Inbound::DestinationUnreachable {
            source,
            code: header.get_icmp_code().0,
            quoted: quoted_echo(icmp),
        },
        IcmpTypes::TimeExceeded => Inbound::TimeExceeded {
            source,
            code: header.get_icmp_code().0,
            quoted: quoted_echo(icmp),
        },
        _ => Inbound::Other,
    };
    Some(inbound)
}

use super::{check_packet_size, invalid_packet_size, ICMPV4_HEADER_LEN, TIMESTAMP_LEN};
use crate::error::Error;
use pnet_packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet_packet::icmp::{IcmpCode, IcmpTypes};
use pnet_packet::{MutablePacket, Packet};
use std::time::{SystemTime, UNIX_EPOCH};

fn write_timestamp(buf: &mut [u8]) {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    buf[0..8].copy_from_slice(&now.as_secs().to_be_bytes());
    buf[8..16].copy_from_slice(&(now.subsec_micros() as u64).to_be_bytes());
}

fn fill_pattern(buf: &mut [u8]) {
    for (i, b) in buf.iter_mut().enumerate() {
        *b = (i & 0xff) as u8;
    }
}

/// Builds an Echo-Request of exactly `size` bytes.
///
/// The payload starts with the construction timestamp and continues with the
/// repeating pattern `i mod 256`. The checksum is written last.
pub fn build_echo_request(sequence: u16, identifier: u16, size: usize) -> Result<Vec<u8>, Error> {
    check_packet_size(size)?;
    let mut buf = vec![0u8; size];
    {
        let mut echo =
            MutableEchoRequestPacket::new(&mut buf[..]).ok_or_else(|| invalid_packet_size(size))?;
        echo.set_icmp_type(IcmpTypes::EchoRequest);
        echo.set_icmp_code(IcmpCode::new(0));
        echo.set_identifier(identifier);
        echo.set_sequence_number(sequence);
        let payload = echo.payload_mut();
        write_timestamp(&mut payload[..TIMESTAMP_LEN]);
        fill_pattern(&mut payload[TIMESTAMP_LEN..]);
        let checksum = pnet_packet::util::checksum(echo.packet(), 1);
        echo.set_checksum(checksum);
    }
    Ok(buf)
}

/// Recomputes the Internet checksum of an ICMP message and compares it with
/// the stored one. The checksum word is skipped rather than zeroed, so the
/// packet is never touched.
pub fn verify_checksum(packet: &[u8]) -> bool {
    if packet.len() < ICMPV4_HEADER_LEN {
        return false;
    }
    let stored = u16::from_be_bytes([packet[2], packet[3]]);
    pnet_packet::util::checksum(packet, 1) == stored
}

/// Checks the bytes after the timestamp region against the `i mod 256`
/// pattern. A payload too short to hold the timestamp fails.
pub fn verify_payload_pattern(payload: &[u8], timestamp_len: usize) -> bool {
    match payload.get(timestamp_len..) {
        Some(data) => data
            .iter()
            .enumerate()
            .all(|(i, b)| *b == (i & 0xff) as u8),
        None => false,
    }
}

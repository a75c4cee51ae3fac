use crate::error::Error;

mod icmpv4;
mod ipv4;

pub use icmpv4::{build_echo_request, verify_checksum, verify_payload_pattern};
pub use ipv4::{parse_datagram, Inbound, QuotedEcho};

/// ICMPv4 echo header: type, code, checksum, identifier, sequence.
pub const ICMPV4_HEADER_LEN: usize = 8;
/// Construction timestamp at the front of the payload: seconds and
/// microseconds since the epoch, both big-endian `u64`.
pub const TIMESTAMP_LEN: usize = 16;
pub const MIN_PACKET_SIZE: usize = ICMPV4_HEADER_LEN + TIMESTAMP_LEN;
/// Largest ICMP message an IPv4 datagram can carry behind a minimal header.
pub const MAX_PACKET_SIZE: usize = 65535 - 20;
pub const DEFAULT_PACKET_SIZE: usize = 64;
/// Large enough for any IPv4 datagram.
pub const RECV_BUFFER_SIZE: usize = 65536;

fn invalid_packet_size(size: usize) -> Error {
    Error::InvalidPacketSize {
        size,
        min: MIN_PACKET_SIZE,
        max: MAX_PACKET_SIZE,
    }
}

/// Checks that an Echo-Request of `size` bytes holds the timestamp and fits
/// in one IPv4 datagram.
pub fn check_packet_size(size: usize) -> Result<(), Error> {
    if (MIN_PACKET_SIZE..=MAX_PACKET_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(invalid_packet_size(size))
    }
}

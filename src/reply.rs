use std::net::Ipv4Addr;
use std::time::Duration;

/// A matched Echo-Reply, published on the progress channel.
#[derive(Clone, Debug)]
pub struct EchoReply {
    /// Probe sequence number
    pub sequence: u64,
    /// Zero for the original transmission, `n` for the n-th retry
    pub attempt: u32,
    /// Source address of the reply
    pub ip_addr: Ipv4Addr,
    /// ICMP message length in bytes
    pub bytes: usize,
    /// TTL value from the received packet
    pub ttl: u8,
    /// Estimated hop count from the source
    pub hop_count: u8,
    /// Round-trip time of the answered attempt
    pub rtt: Duration,
    pub checksum_valid: bool,
    pub payload_valid: bool,
}

impl EchoReply {
    pub fn is_corrupted(&self) -> bool {
        !self.checksum_valid || !self.payload_valid
    }
}

pub(crate) fn guess_initial_ttl(ttl: u8) -> u8 {
    if ttl <= 64 {
        64
    } else if ttl <= 128 {
        128
    } else {
        255
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_ttl_buckets() {
        assert_eq!(guess_initial_ttl(1), 64);
        assert_eq!(guess_initial_ttl(64), 64);
        assert_eq!(guess_initial_ttl(65), 128);
        assert_eq!(guess_initial_ttl(200), 255);
    }
}

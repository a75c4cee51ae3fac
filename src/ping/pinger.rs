use super::{ExperimentMode, PingResult, ProbeEngine};
use crate::error::Error;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::packet::{self, DEFAULT_PACKET_SIZE};
use crate::reply::EchoReply;
use crate::socket::icmp::{AsyncIcmpSocket, IcmpConfig};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_TTL: u8 = 64;
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_RETRIES: u32 = 3;
/// Fixed wait before a retransmission, independent of the pacing mode.
pub const RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Configuration of a probe run against a single IPv4 target.
#[derive(Clone, Debug)]
pub struct Pinger {
    /// Target as given by the operator, used in the banner.
    pub host: String,
    /// Destination IP address.
    pub dst_ip: Ipv4Addr,
    /// ICMP identifier marking this run's packets.
    pub identifier: u16,
    /// Size of the ICMP message in bytes, header included. Default is `64`.
    pub packet_size: usize,
    /// Time to live (TTL). Default is `64`.
    pub ttl: u8,
    /// Number of original probes; `None` runs until cancelled.
    pub probe_count: Option<u64>,
    /// Fixed delay between probes, overriding the mode's pacing.
    pub send_interval: Option<Duration>,
    /// Timeout for receiving each probe response.
    pub receive_timeout: Duration,
    /// Retransmissions allowed per sequence number.
    pub retries: u32,
    /// Delay before each retransmission.
    pub retry_interval: Duration,
    /// Experiment mode selecting the pacing.
    pub mode: ExperimentMode,
    /// Number of probes tracked for RTT statistics.
    pub history_capacity: usize,
    /// Broadcast sender for per-reply progress events.
    pub progress_tx: broadcast::Sender<EchoReply>,
}

/// Low 16 bits of the process id.
pub fn default_identifier() -> u16 {
    (std::process::id() & 0xffff) as u16
}

/// Resolves a host name or dotted quad to its first IPv4 address.
pub fn resolve_ipv4(host: &str) -> Result<Ipv4Addr, Error> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Ok(ip);
    }
    let addrs = dns_lookup::lookup_host(host).map_err(|source| Error::Resolve {
        host: host.to_string(),
        source,
    })?;
    addrs
        .into_iter()
        .find_map(|ip| match ip {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| Error::NoIpv4Address(host.to_string()))
}

impl Pinger {
    /// Creates a new `Pinger` for the destination address with default settings.
    pub fn new(dst_ip: Ipv4Addr) -> Pinger {
        let (progress_tx, _) = broadcast::channel(256);
        Pinger {
            host: dst_ip.to_string(),
            dst_ip,
            identifier: default_identifier(),
            packet_size: DEFAULT_PACKET_SIZE,
            ttl: DEFAULT_TTL,
            probe_count: None,
            send_interval: None,
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            retries: DEFAULT_RETRIES,
            retry_interval: RETRY_INTERVAL,
            mode: ExperimentMode::Standard,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            progress_tx,
        }
    }
    /// Resolves `host` and creates a `Pinger` for it.
    pub fn resolve(host: &str) -> Result<Pinger, Error> {
        let mut pinger = Pinger::new(resolve_ipv4(host)?);
        pinger.host = host.to_string();
        Ok(pinger)
    }
    /// Checks the settings that must hold before any socket is opened.
    pub fn validate(&self) -> Result<(), Error> {
        packet::check_packet_size(self.packet_size)
    }
    /// Opens a raw ICMP socket and probes until the count is reached or
    /// `cancel` fires. Statistics are reported before the socket is closed.
    pub async fn ping_async(&self, cancel: CancellationToken) -> Result<PingResult, Error> {
        self.validate()?;
        let mut cfg = IcmpConfig::new();
        cfg.ttl = Some(self.ttl as u32);
        cfg.read_timeout = Some(self.receive_timeout);
        let socket = AsyncIcmpSocket::new(&cfg)?;
        let engine = ProbeEngine::new(self.clone(), socket, cancel)?;
        Ok(engine.run().await)
    }
    /// Sets the packet size.
    pub fn set_packet_size(&mut self, packet_size: usize) {
        self.packet_size = packet_size;
    }
    /// Sets the TTL value.
    pub fn set_ttl(&mut self, ttl: u8) {
        self.ttl = ttl;
    }
    /// Sets the number of probes to send.
    pub fn set_probe_count(&mut self, probe_count: Option<u64>) {
        self.probe_count = probe_count;
    }
    /// Sets a fixed interval between probes.
    pub fn set_send_interval(&mut self, send_interval: Option<Duration>) {
        self.send_interval = send_interval;
    }
    /// Sets the per-probe receive timeout.
    pub fn set_receive_timeout(&mut self, receive_timeout: Duration) {
        self.receive_timeout = receive_timeout;
    }
    /// Sets the number of retries per probe.
    pub fn set_retries(&mut self, retries: u32) {
        self.retries = retries;
    }
    /// Sets the experiment mode.
    pub fn set_mode(&mut self, mode: ExperimentMode) {
        self.mode = mode;
    }
    /// Returns a receiver for per-reply progress events.
    pub fn get_progress_receiver(&self) -> broadcast::Receiver<EchoReply> {
        self.progress_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{MAX_PACKET_SIZE, MIN_PACKET_SIZE};

    #[test]
    fn defaults() {
        let pinger = Pinger::new(Ipv4Addr::new(192, 0, 2, 1));
        assert_eq!(pinger.host, "192.0.2.1");
        assert_eq!(pinger.packet_size, 64);
        assert_eq!(pinger.ttl, 64);
        assert_eq!(pinger.probe_count, None);
        assert_eq!(pinger.receive_timeout, Duration::from_secs(5));
        assert_eq!(pinger.retries, 3);
        assert_eq!(pinger.mode, ExperimentMode::Standard);
        assert!(pinger.validate().is_ok());
    }

    #[test]
    fn packet_size_is_validated() {
        let mut pinger = Pinger::new(Ipv4Addr::LOCALHOST);
        pinger.set_packet_size(MIN_PACKET_SIZE - 1);
        assert!(matches!(
            pinger.validate(),
            Err(Error::InvalidPacketSize { .. })
        ));
        pinger.set_packet_size(MAX_PACKET_SIZE + 1);
        assert!(pinger.validate().is_err());
        pinger.set_packet_size(MAX_PACKET_SIZE);
        assert!(pinger.validate().is_ok());
    }

    #[test]
    fn dotted_quad_resolves_without_lookup() {
        assert_eq!(resolve_ipv4("10.1.2.3").unwrap(), Ipv4Addr::new(10, 1, 2, 3));
        let pinger = Pinger::resolve("127.0.0.1").unwrap();
        assert_eq!(pinger.dst_ip, Ipv4Addr::LOCALHOST);
        assert_eq!(pinger.host, "127.0.0.1");
    }
}

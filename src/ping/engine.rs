use super::{PingResult, PingStatus, Pinger};
use crate::error::Error;
use crate::history::History;
use crate::packet::{self, Inbound, QuotedEcho, ICMPV4_HEADER_LEN, RECV_BUFFER_SIZE, TIMESTAMP_LEN};
use crate::reply::{guess_initial_ttl, EchoReply};
use crate::socket::Transport;
use crate::stats::Statistics;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How a single reply wait ended.
enum Wait {
    Matched(EchoReply),
    TimedOut,
    Cancelled,
}

/// Final state of one sequence number.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Matched,
    Exhausted,
    Cancelled,
}

/// Sends one sequence at a time, waits for its reply with bounded retries
/// and records the outcome before moving on.
///
/// The engine is the only writer of its [`History`]; statistics are taken
/// once, after the loop has stopped.
pub struct ProbeEngine<T> {
    config: Pinger,
    transport: T,
    target: SocketAddr,
    history: History,
    cancel: CancellationToken,
}

impl<T: Transport> ProbeEngine<T> {
    pub fn new(config: Pinger, transport: T, cancel: CancellationToken) -> Result<Self, Error> {
        config.validate()?;
        Ok(ProbeEngine {
            target: SocketAddr::new(IpAddr::V4(config.dst_ip), 0),
            history: History::with_capacity(config.history_capacity),
            config,
            transport,
            cancel,
        })
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    fn count_reached(&self) -> bool {
        self.config
            .probe_count
            .map_or(false, |count| self.history.counters().original_sent >= count)
    }

    fn next_interval(&self) -> Duration {
        self.config
            .send_interval
            .unwrap_or_else(|| self.config.mode.interval())
    }

    /// Runs until the probe count is reached or the token is cancelled, then
    /// reports statistics. The transport is released when this returns.
    pub async fn run(mut self) -> PingResult {
        info!(
            "PING {} ({}): {} bytes of data with {} mode",
            self.config.host,
            self.config.dst_ip,
            self.config.packet_size - ICMPV4_HEADER_LEN,
            self.config.mode
        );
        let start_time = Instant::now();
        let mut status = PingStatus::Done;
        let mut sequence: u64 = 0;
        loop {
            if self.cancel.is_cancelled() {
                status = PingStatus::Interrupted;
                break;
            }
            if self.count_reached() {
                break;
            }
            if self.probe(sequence).await == Outcome::Cancelled {
                status = PingStatus::Interrupted;
                break;
            }
            sequence += 1;
            if self.count_reached() {
                break;
            }
            let interval = self.next_interval();
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    status = PingStatus::Interrupted;
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }

        let statistics = Statistics::from_history(&self.history);
        statistics.report();
        PingResult {
            history: self.history,
            statistics,
            status,
            probe_time: start_time.elapsed(),
        }
    }

    async fn probe(&mut self, sequence: u64) -> Outcome {
        let wire_sequence = sequence as u16;
        let retries = self.config.retries;
        self.history.record_sent(sequence, Instant::now());

        let mut attempt: u32 = 0;
        loop {
            if attempt > 0 {
                self.history.record_retry(sequence);
                info!("Retrying seq={} (attempt {}/{})", sequence, attempt, retries);
            }

            let packet = match packet::build_echo_request(
                wire_sequence,
                self.config.identifier,
                self.config.packet_size,
            ) {
                Ok(packet) => packet,
                Err(e) => {
                    error!("{}", e);
                    return Outcome::Exhausted;
                }
            };

            let send_time = Instant::now();
            match self.transport.send_to(&packet, self.target).await {
                Ok(_) => self.history.record_transmission(),
                Err(e) => warn!("sendto failed for icmp_seq={}: {}", sequence, e),
            }

            match self.await_reply(sequence, attempt, send_time).await {
                Wait::Matched(reply) => {
                    self.accept(reply);
                    return Outcome::Matched;
                }
                Wait::Cancelled => return Outcome::Cancelled,
                Wait::TimedOut => info!(
                    "Request timeout for icmp_seq={} (try {}/{})",
                    sequence,
                    attempt + 1,
                    retries + 1
                ),
            }

            attempt += 1;
            if attempt > retries {
                return Outcome::Exhausted;
            }
            tokio::select! {
                _ = self.cancel.cancelled() => return Outcome::Cancelled,
                _ = tokio::time::sleep(self.config.retry_interval) => {}
            }
        }
    }

    /// Routing errors count only when they quote this run's request, or
    /// quote nothing usable.
    fn quotes_this_probe(&self, quoted: Option<QuotedEcho>, wire_sequence: u16) -> bool {
        match quoted {
            Some(echo) => {
                echo.identifier == self.config.identifier && echo.sequence == wire_sequence
            }
            None => true,
        }
    }

    /// Reads until a matching reply arrives, the attempt's deadline passes or
    /// the run is cancelled. Unrelated datagrams do not extend the deadline.
    async fn await_reply(&self, sequence: u64, attempt: u32, send_time: Instant) -> Wait {
        let wire_sequence = sequence as u16;
        let deadline = send_time + self.config.receive_timeout;
        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        loop {
            let received = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Wait::Cancelled,
                r = tokio::time::timeout_at(deadline, self.transport.recv_from(&mut buf)) => r,
            };
            let len = match received {
                Err(_elapsed) => return Wait::TimedOut,
                Ok(Err(e))
                    if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                {
                    return Wait::TimedOut
                }
                Ok(Err(e)) => {
                    warn!("recvfrom failed for icmp_seq={}: {}", sequence, e);
                    return Wait::TimedOut;
                }
                Ok(Ok((len, _addr))) => len,
            };
            let rtt = send_time.elapsed();

            match packet::parse_datagram(&buf[..len]) {
                Some(Inbound::EchoReply {
                    source,
                    ttl,
                    identifier,
                    sequence: reply_sequence,
                    icmp,
                }) if identifier == self.config.identifier && reply_sequence == wire_sequence => {
                    return Wait::Matched(EchoReply {
                        sequence,
                        attempt,
                        ip_addr: source,
                        bytes: icmp.len(),
                        ttl,
                        hop_count: guess_initial_ttl(ttl) - ttl,
                        rtt,
                        checksum_valid: packet::verify_checksum(icmp),
                        payload_valid: packet::verify_payload_pattern(
                            &icmp[ICMPV4_HEADER_LEN..],
                            TIMESTAMP_LEN,
                        ),
                    });
                }
                Some(Inbound::DestinationUnreachable {
                    source,
                    code,
                    quoted,
                }) if self.quotes_this_probe(quoted, wire_sequence) => {
                    info!(
                        "From {}: Destination unreachable (code={}) for icmp_seq={}",
                        source, code, sequence
                    );
                }
                Some(Inbound::TimeExceeded { source, quoted, .. })
                    if self.quotes_this_probe(quoted, wire_sequence) =>
                {
                    info!(
                        "From {}: Time to live exceeded for icmp_seq={}",
                        source, sequence
                    );
                }
                _ => {}
            }
        }
    }

    fn accept(&mut self, reply: EchoReply) {
        let corrupted = reply.is_corrupted();
        self.history.record_match(corrupted);
        self.history.record_reply(reply.sequence, reply.rtt, corrupted);
        info!(
            "{} bytes from {}: icmp_seq={} ttl={} time={:.3} ms{}",
            reply.bytes,
            reply.ip_addr,
            reply.sequence,
            reply.ttl,
            reply.rtt.as_secs_f64() * 1000.0,
            if corrupted { " [CORRUPTED]" } else { "" }
        );
        if corrupted {
            info!(
                "  Corruption details: checksum={}, data={}",
                if reply.checksum_valid { "valid" } else { "invalid" },
                if reply.payload_valid { "valid" } else { "invalid" }
            );
        }
        let _ = self.config.progress_tx.send(reply);
    }
}

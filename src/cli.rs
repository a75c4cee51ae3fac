use clap::Parser;
use echoprobe::packet::{check_packet_size, DEFAULT_PACKET_SIZE};
use echoprobe::ping::{
    ExperimentMode, Pinger, DEFAULT_RECEIVE_TIMEOUT, DEFAULT_RETRIES, DEFAULT_TTL,
};
use echoprobe::Error;
use std::path::PathBuf;
use std::time::Duration;

/// ICMP echo prober with retries, corruption detection and experiment pacing.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Target host name or IPv4 address
    pub target: String,

    /// Packet size in bytes, ICMP header included
    #[arg(short = 's', long, default_value_t = DEFAULT_PACKET_SIZE)]
    pub size: usize,

    /// Time to live
    #[arg(short = 't', long, default_value_t = DEFAULT_TTL)]
    pub ttl: u8,

    /// Number of packets to send (default: until interrupted)
    #[arg(short = 'c', long)]
    pub count: Option<u64>,

    /// Wait interval in ms (default: mode dependent)
    #[arg(short = 'i', long)]
    pub interval: Option<u64>,

    /// Response timeout in seconds
    #[arg(short = 'w', long, default_value_t = DEFAULT_RECEIVE_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Number of retries per packet
    #[arg(short = 'r', long, default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,

    /// Experiment mode (1=standard, 2=aggressive, 3=intermittent)
    #[arg(short = 'm', long, default_value_t = 1)]
    pub mode: u8,

    /// Log file, overwritten at startup
    #[arg(short = 'l', long = "log-file")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Rejects settings that are invalid regardless of the target.
    pub fn validate(&self) -> Result<ExperimentMode, Error> {
        check_packet_size(self.size)?;
        ExperimentMode::try_from(self.mode)
    }

    pub fn apply(&self, pinger: &mut Pinger, mode: ExperimentMode) {
        pinger.set_packet_size(self.size);
        pinger.set_ttl(self.ttl);
        pinger.set_probe_count(self.count);
        pinger.set_send_interval(self.interval.map(Duration::from_millis));
        pinger.set_receive_timeout(Duration::from_secs(self.timeout));
        pinger.set_retries(self.retries);
        pinger.set_mode(mode);
    }
}

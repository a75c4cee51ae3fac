use std::io;
use std::path::PathBuf;

/// Errors that stop a run before or while it is set up.
///
/// Transient transport failures during a run are logged by the engine and
/// never surface here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid packet size {size}: must be between {min} and {max} bytes")]
    InvalidPacketSize { size: usize, min: usize, max: usize },

    #[error("invalid mode {0}: must be between 1 and 3")]
    InvalidMode(u8),

    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("{0} has no IPv4 address")]
    NoIpv4Address(String),

    #[error("failed to create raw ICMP socket (requires root or CAP_NET_RAW): {0}")]
    Socket(#[source] io::Error),

    #[error("failed to set socket option {option}: {source}")]
    SocketOption {
        option: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

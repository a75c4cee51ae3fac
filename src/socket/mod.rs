pub mod icmp;

use std::io;
use std::net::SocketAddr;

/// Datagram transport used by the probe engine.
///
/// `recv_from` must be cancel safe: the engine drops the future when its
/// reply deadline passes or the run is interrupted.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize>;
    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;
}

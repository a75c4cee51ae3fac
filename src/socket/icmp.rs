use super::Transport;
use crate::error::Error;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{SocketAddr, UdpSocket as StdUdpSocket};
use std::time::Duration;
use tokio::net::UdpSocket;

#[derive(Debug, Clone)]
pub struct IcmpConfig {
    pub ttl: Option<u32>,
    pub read_timeout: Option<Duration>,
}

impl IcmpConfig {
    pub fn new() -> Self {
        Self {
            ttl: None,
            read_timeout: None,
        }
    }
}

impl Default for IcmpConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw ICMPv4 socket driven by tokio. Received datagrams include the IPv4
/// header.
#[derive(Debug)]
pub struct AsyncIcmpSocket {
    inner: UdpSocket,
}

impl AsyncIcmpSocket {
    pub fn new(config: &IcmpConfig) -> Result<Self, Error> {
        let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))
            .map_err(Error::Socket)?;

        socket
            .set_nonblocking(true)
            .map_err(|source| Error::SocketOption {
                option: "O_NONBLOCK",
                source,
            })?;
        if let Some(ttl) = config.ttl {
            socket.set_ttl(ttl).map_err(|source| Error::SocketOption {
                option: "IP_TTL",
                source,
            })?;
        }
        if let Some(timeout) = config.read_timeout {
            socket
                .set_read_timeout(Some(timeout))
                .map_err(|source| Error::SocketOption {
                    option: "SO_RCVTIMEO",
                    source,
                })?;
        }

        let std_socket: StdUdpSocket = socket.into();
        let inner = UdpSocket::from_std(std_socket).map_err(Error::Socket)?;
        Ok(Self { inner })
    }
}

impl Transport for AsyncIcmpSocket {
    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        self.inner.send_to(buf, target).await
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.inner.recv_from(buf).await
    }
}

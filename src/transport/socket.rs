//! TCP and UDP connections to the log collector.
//!
//! - TCP: one long-lived stream, records newline-delimited (`json_lines`)
//! - UDP: one datagram per record (`json`)
//!
//! # Example
//!
//! ```ignore
//! use logstash_notifier::transport::{Protocol, Transport};
//!
//! let mut transport = Transport::connect(Protocol::Udp, "127.0.0.1", 5959).await?;
//! transport.send(b"{\"message\":\"hello\"}").await?;
//! ```

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use tokio::io::AsyncWriteExt;
use tokio::net::{lookup_host, TcpStream, UdpSocket};

use crate::error::{NotifierError, Result};

/// Collector protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Stream of newline-terminated records.
    Tcp,
    /// One datagram per record.
    Udp,
}

impl FromStr for Protocol {
    type Err = NotifierError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            other => Err(NotifierError::Config(format!(
                "unsupported protocol {:?}, expected tcp or udp",
                other
            ))),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
        }
    }
}

/// Connected collector socket.
#[derive(Debug)]
pub enum Transport {
    /// Connected TCP stream.
    Tcp(TcpStream),
    /// UDP socket connected to the collector address.
    Udp(UdpSocket),
}

impl Transport {
    /// Connect to the collector.
    ///
    /// For UDP this only fixes the peer address; nothing is sent.
    pub async fn connect(protocol: Protocol, host: &str, port: u16) -> Result<Self> {
        let addr = resolve(host, port).await?;

        match protocol {
            Protocol::Tcp => {
                let stream = TcpStream::connect(addr)
                    .await
                    .map_err(|e| connect_error(protocol, addr, e))?;
                stream.set_nodelay(true)?;
                Ok(Transport::Tcp(stream))
            }
            Protocol::Udp => {
                let local: SocketAddr = if addr.is_ipv4() {
                    ([0u8; 4], 0).into()
                } else {
                    ([0u16; 8], 0).into()
                };
                let socket = UdpSocket::bind(local).await?;
                socket
                    .connect(addr)
                    .await
                    .map_err(|e| connect_error(protocol, addr, e))?;
                Ok(Transport::Udp(socket))
            }
        }
    }

    /// Protocol of this connection.
    pub fn protocol(&self) -> Protocol {
        match self {
            Transport::Tcp(_) => Protocol::Tcp,
            Transport::Udp(_) => Protocol::Udp,
        }
    }

    /// Send one serialized record.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::Transport`] on write failure or a short
    /// datagram.
    pub async fn send(&mut self, record: &[u8]) -> Result<()> {
        match self {
            Transport::Tcp(stream) => {
                stream
                    .write_all(record)
                    .await
                    .map_err(|e| NotifierError::Transport(format!("tcp write failed: {}", e)))?;
                stream
                    .flush()
                    .await
                    .map_err(|e| NotifierError::Transport(format!("tcp flush failed: {}", e)))?;
            }
            Transport::Udp(socket) => {
                let sent = socket
                    .send(record)
                    .await
                    .map_err(|e| NotifierError::Transport(format!("udp send failed: {}", e)))?;
                if sent != record.len() {
                    return Err(NotifierError::Transport(format!(
                        "udp datagram truncated: sent {} of {} bytes",
                        sent,
                        record.len()
                    )));
                }
            }
        }
        Ok(())
    }
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    lookup_host((host, port))
        .await
        .map_err(|e| NotifierError::Transport(format!("cannot resolve {}:{}: {}", host, port, e)))?
        .next()
        .ok_or_else(|| NotifierError::Transport(format!("no address for {}:{}", host, port)))
}

fn connect_error(protocol: Protocol, addr: SocketAddr, e: std::io::Error) -> NotifierError {
    NotifierError::Transport(format!("{} connect to {} failed: {}", protocol, addr, e))
}

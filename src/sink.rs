//! Destinations for accepted events.
//!
//! The listener only needs something that takes an [`Event`] and either
//! delivers it or reports a transport failure. [`LogstashSink`] is the real
//! one: it formats the event with a [`RecordFormatter`] and writes it to a
//! [`Transport`].

use std::future::Future;
use std::pin::Pin;

use crate::codec::{ensure_trailing_newline, RecordFormatter};
use crate::error::Result;
use crate::protocol::Event;
use crate::transport::{Protocol, Transport};

/// Boxed future for sink results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something that accepts events.
pub trait Sink: Send {
    /// Deliver one event.
    ///
    /// Errors are [`NotifierError::Transport`](crate::NotifierError::Transport)
    /// or serialization failures; retry is up to the implementation.
    fn send<'a>(&'a mut self, event: &'a Event) -> BoxFuture<'a, Result<()>>;
}

/// Sink that ships Logstash JSON records over TCP or UDP.
pub struct LogstashSink {
    transport: Transport,
    formatter: RecordFormatter,
}

impl LogstashSink {
    /// Create a sink over a connected transport.
    pub fn new(transport: Transport, formatter: RecordFormatter) -> Self {
        Self {
            transport,
            formatter,
        }
    }

    /// Connect to the collector and create a sink.
    pub async fn connect(
        protocol: Protocol,
        host: &str,
        port: u16,
        formatter: RecordFormatter,
    ) -> Result<Self> {
        let transport = Transport::connect(protocol, host, port).await?;
        Ok(Self::new(transport, formatter))
    }

    /// Protocol of the underlying transport.
    pub fn protocol(&self) -> Protocol {
        self.transport.protocol()
    }

    /// Serialize and send one event.
    pub async fn send_event(&mut self, event: &Event) -> Result<()> {
        let mut record = self.formatter.format(event)?;
        // TCP collectors split the stream on newlines.
        if self.transport.protocol() == Protocol::Tcp {
            record = ensure_trailing_newline(record);
        }
        self.transport.send(&record).await
    }
}

impl Sink for LogstashSink {
    fn send<'a>(&'a mut self, event: &'a Event) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.send_event(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decode_keyvals;
    use tokio::io::AsyncReadExt;
    use tokio::net::{TcpListener, UdpSocket};

    fn running_event(process: &str) -> Event {
        Event::new(
            decode_keyvals("eventname:PROCESS_STATE_RUNNING len:0"),
            decode_keyvals(&format!("processname:{} pid:12", process)),
            String::new(),
        )
    }

    #[tokio::test]
    async fn test_tcp_records_are_newline_delimited() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut sink = LogstashSink::connect(
            Protocol::Tcp,
            "127.0.0.1",
            port,
            RecordFormatter::new("web-1"),
        )
        .await
        .unwrap();
        let (mut peer, _) = listener.accept().await.unwrap();

        sink.send(&running_event("cat")).await.unwrap();
        sink.send(&running_event("dog")).await.unwrap();
        drop(sink);

        let mut received = String::new();
        peer.read_to_string(&mut received).await.unwrap();
        let lines: Vec<serde_json::Value> = received
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["processname"], "cat");
        assert_eq!(lines[1]["processname"], "dog");
    }

    #[tokio::test]
    async fn test_udp_datagram_per_record() {
        let collector = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = collector.local_addr().unwrap().port();

        let formatter = RecordFormatter::new("web-1").coerce_integers(true);
        let mut sink = LogstashSink::connect(Protocol::Udp, "127.0.0.1", port, formatter)
            .await
            .unwrap();
        assert_eq!(sink.protocol(), Protocol::Udp);

        sink.send(&running_event("cat")).await.unwrap();

        let mut buf = vec![0u8; 4096];
        let n = collector.recv(&mut buf).await.unwrap();
        assert_ne!(buf[n - 1], b'\n');

        let record: serde_json::Value = serde_json::from_slice(&buf[..n]).unwrap();
        assert_eq!(record["pid"], 12);
        assert_eq!(record["eventname"], "PROCESS_STATE_RUNNING");
    }
}

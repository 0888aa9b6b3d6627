//! Forwarding loop from the listener to a sink.

use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::error::Result;
use crate::listener::EventListener;
use crate::sink::Sink;

/// Counts from one relay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Events delivered to the sink.
    pub forwarded: u64,
    /// Events the sink failed to deliver.
    pub failed: u64,
}

/// Forward accepted events until end of input.
///
/// A sink failure is logged and counted; the supervisor has already been
/// acknowledged, so the event is dropped and the relay moves on.
///
/// # Errors
///
/// Framing and stdio errors from the listener end the relay.
pub async fn relay<R, W, S>(
    listener: &mut EventListener<R, W>,
    sink: &mut S,
) -> Result<RelayStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Sink + ?Sized,
{
    let mut stats = RelayStats::default();

    while let Some(event) = listener.next_event().await? {
        match sink.send(&event).await {
            Ok(()) => {
                stats.forwarded += 1;
                tracing::debug!(
                    "Forwarded {} for {}",
                    event.event_name().unwrap_or_default(),
                    event.process_name().unwrap_or_default()
                );
            }
            Err(e) => {
                stats.failed += 1;
                tracing::warn!(
                    "Failed to forward {} for {} (serial {}): {}",
                    event.event_name().unwrap_or_default(),
                    event.process_name().unwrap_or_default(),
                    event.serial().unwrap_or("?"),
                    e
                );
            }
        }
    }

    tracing::info!(
        "Supervisor closed the event stream after {} frames ({} forwarded, {} failed)",
        listener.frames_read(),
        stats.forwarded,
        stats.failed
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifierError;
    use crate::listener::EventFilter;
    use crate::protocol::Event;
    use crate::sink::BoxFuture;

    /// Records process names; fails for the ones listed in `reject`.
    #[derive(Default)]
    struct RecordingSink {
        seen: Vec<String>,
        reject: Vec<String>,
    }

    impl Sink for RecordingSink {
        fn send<'a>(&'a mut self, event: &'a Event) -> BoxFuture<'a, Result<()>> {
            Box::pin(async move {
                let name = event.process_name().unwrap_or_default().to_string();
                if self.reject.contains(&name) {
                    return Err(NotifierError::Transport("connection reset".into()));
                }
                self.seen.push(name);
                Ok(())
            })
        }
    }

    fn frame(event: &str, process: &str) -> String {
        let payload = format!("processname:{} pid:1", process);
        format!("eventname:{} len:{}\n{}", event, payload.len(), payload)
    }

    #[tokio::test]
    async fn test_relay_forwards_in_order() {
        let input = [
            frame("PROCESS_STATE_RUNNING", "cat"),
            frame("PROCESS_STATE_UNKNOWN", "dog"),
            frame("PROCESS_STATE_EXITED", "logstash-notifier"),
            frame("PROCESS_STATE_EXITED", "cat"),
        ]
        .concat();
        let mut output = Vec::new();
        let filter = EventFilter::new(["PROCESS_STATE_RUNNING", "PROCESS_STATE_EXITED"]);
        let mut listener = EventListener::new(input.as_bytes(), &mut output, filter);
        let mut sink = RecordingSink::default();

        let stats = relay(&mut listener, &mut sink).await.unwrap();

        assert_eq!(stats, RelayStats { forwarded: 2, failed: 0 });
        assert_eq!(sink.seen, vec!["cat", "cat"]);
        assert_eq!(listener.frames_read(), 4);
    }

    #[tokio::test]
    async fn test_relay_survives_sink_failure() {
        let input = [
            frame("PROCESS_STATE_FATAL", "flaky"),
            frame("PROCESS_STATE_FATAL", "steady"),
        ]
        .concat();
        let mut output = Vec::new();
        let mut listener = EventListener::new(
            input.as_bytes(),
            &mut output,
            EventFilter::new(["PROCESS_STATE_FATAL"]),
        );
        let mut sink = RecordingSink {
            reject: vec!["flaky".to_string()],
            ..Default::default()
        };

        let stats = relay(&mut listener, &mut sink).await.unwrap();

        assert_eq!(stats, RelayStats { forwarded: 1, failed: 1 });
        assert_eq!(sink.seen, vec!["steady"]);
    }

    #[tokio::test]
    async fn test_relay_stops_on_framing_error() {
        let input = format!(
            "{}eventname:PROCESS_STATE_FATAL\n",
            frame("PROCESS_STATE_FATAL", "cat")
        );
        let mut output = Vec::new();
        let mut listener = EventListener::new(
            input.as_bytes(),
            &mut output,
            EventFilter::new(["PROCESS_STATE_FATAL"]),
        );
        let mut sink = RecordingSink::default();

        let err = relay(&mut listener, &mut sink).await.unwrap_err();

        assert!(err.is_framing());
        assert_eq!(sink.seen, vec!["cat"]);
    }
}

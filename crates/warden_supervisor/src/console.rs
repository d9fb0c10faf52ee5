//! Console output sinks.
//!
//! When a server starts in capture mode its stdout/stderr are read line by
//! line and pushed into a [`ConsoleSink`] keyed by server identity. The host
//! supplies the sink; two stock implementations cover the common cases.

use std::sync::Arc;
use std::sync::Mutex;
use tokio::sync::mpsc;
use warden_settings::ServerId;

/// One captured console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub id: ServerId,
    pub text: String,
}

/// Line-oriented sink for captured console output.
///
/// Called from the capture tasks; implementations must not block, or they
/// stall the pipe and eventually the child.
pub trait ConsoleSink: Send + Sync {
    fn line(&self, id: ServerId, text: &str);
}

/// Sink that forwards lines over an unbounded channel to the host.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ConsoleLine>,
}

impl ChannelSink {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ConsoleLine>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl ConsoleSink for ChannelSink {
    fn line(&self, id: ServerId, text: &str) {
        // Receiver gone means the host stopped listening; drop the line.
        let _ = self.tx.send(ConsoleLine {
            id,
            text: text.to_string(),
        });
    }
}

/// Sink that accumulates lines in memory. Used by tests and the CLI echo.
#[derive(Default)]
pub struct BufferSink {
    lines: Mutex<Vec<ConsoleLine>>,
}

impl BufferSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Drain everything captured so far.
    pub fn take(&self) -> Vec<ConsoleLine> {
        std::mem::take(&mut self.lines.lock().expect("console buffer poisoned"))
    }

    pub fn len(&self) -> usize {
        self.lines.lock().expect("console buffer poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConsoleSink for BufferSink {
    fn line(&self, id: ServerId, text: &str) {
        self.lines
            .lock()
            .expect("console buffer poisoned")
            .push(ConsoleLine {
                id,
                text: text.to_string(),
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_sink_keeps_lines_in_order() {
        let sink = BufferSink::new();
        sink.line(ServerId::new(1), "first");
        sink.line(ServerId::new(1), "second");

        let lines = sink.take();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "first");
        assert_eq!(lines[1].text, "second");
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn channel_sink_delivers_keyed_lines() {
        let (sink, mut rx) = ChannelSink::new();
        sink.line(ServerId::new(9), "hello");

        let line = rx.recv().await.unwrap();
        assert_eq!(line.id, ServerId::new(9));
        assert_eq!(line.text, "hello");
    }

    #[test]
    fn channel_sink_tolerates_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        // Must not panic.
        sink.line(ServerId::new(1), "into the void");
    }
}

//! The stream pump: the single worker that owns all matching state.
//!
//! Producers never touch a [`MatchCoordinator`] directly. They send copied
//! chunks over an `mpsc` queue and the pump feeds them through the
//! coordinator of the right stream, writes the resolved output to that
//! stream's sink, and runs each stream's flush timer.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Instant;

use super::coordinator::MatchCoordinator;
use super::MaskerConfig;

/// Identifies one writer and its sink inside the pump.
pub(crate) type StreamId = usize;

/// Reply to a flush or close request: the latched sink error, if any.
pub(crate) type Reply = Sender<Option<io::Error>>;

/// Messages accepted by the pump, processed strictly in arrival order.
pub(crate) enum Message {
    /// Register a new stream and the sink its output goes to.
    Attach {
        stream: StreamId,
        sink: Box<dyn Write + Send>,
    },
    /// A chunk written by a producer.
    Data { stream: StreamId, bytes: Vec<u8> },
    /// Release everything pending, flush sinks, then reply.
    Flush { reply: Reply },
    /// Like `Flush`, then stop the pump.
    Close { reply: Reply },
}

struct Stream {
    coordinator: MatchCoordinator,
    sink: Box<dyn Write + Send>,
    /// When this stream's pending bytes are released if no data arrives.
    deadline: Option<Instant>,
}

/// Worker state. Lives on the pump thread only.
pub(crate) struct StreamPump {
    config: Arc<MaskerConfig>,
    streams: BTreeMap<StreamId, Stream>,
    /// First sink failure. Once set, output is dropped instead of written.
    error: Option<io::Error>,
    scratch: Vec<u8>,
}

impl StreamPump {
    pub(crate) fn new(config: Arc<MaskerConfig>) -> Self {
        Self {
            config,
            streams: BTreeMap::new(),
            error: None,
            scratch: Vec::new(),
        }
    }

    /// Drain `rx` until a close request arrives or every sender is gone.
    pub(crate) fn run(mut self, rx: Receiver<Message>) {
        tracing::debug!(
            patterns = self.config.patterns.len(),
            timeout_ms = self.config.flush_timeout.as_millis() as u64,
            "stream pump started"
        );

        loop {
            // Checked before every receive so a busy stream cannot starve
            // another stream's timer.
            let now = Instant::now();
            self.release_expired(now);

            let message = match self.next_deadline() {
                Some(at) => match rx.recv_timeout(at.saturating_duration_since(now)) {
                    Ok(message) => message,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match rx.recv() {
                    Ok(message) => message,
                    Err(_) => break,
                },
            };

            match message {
                Message::Attach { stream, sink } => {
                    tracing::debug!(stream, "stream attached");
                    let coordinator =
                        MatchCoordinator::new(&self.config.patterns, self.config.mask.clone());
                    self.streams.insert(
                        stream,
                        Stream {
                            coordinator,
                            sink,
                            deadline: None,
                        },
                    );
                }
                Message::Data { stream, bytes } => {
                    self.process(stream, &bytes);
                }
                Message::Flush { reply } => {
                    self.release_pending();
                    self.flush_sinks();
                    let _ = reply.send(self.latched_error());
                }
                Message::Close { reply } => {
                    self.release_pending();
                    self.flush_sinks();
                    let _ = reply.send(self.latched_error());
                    tracing::debug!("stream pump closed");
                    return;
                }
            }
        }

        // Every handle was dropped without an explicit close.
        self.release_pending();
        self.flush_sinks();
        tracing::debug!("stream pump stopped");
    }

    fn process(&mut self, stream: StreamId, bytes: &[u8]) {
        let Self {
            config,
            streams,
            error,
            scratch,
        } = self;

        let Some(target) = streams.get_mut(&stream) else {
            tracing::warn!(stream, "dropping data for unknown stream");
            return;
        };

        tracing::trace!(stream, len = bytes.len(), "processing chunk");
        scratch.clear();
        target.coordinator.push_all(bytes, scratch);
        forward(target.sink.as_mut(), scratch, error);

        // Only this stream's timer is re-armed; others keep their deadline.
        target.deadline = if target.coordinator.is_idle() {
            None
        } else {
            Instant::now().checked_add(config.flush_timeout)
        };
    }

    /// Earliest deadline among streams holding bytes back.
    fn next_deadline(&self) -> Option<Instant> {
        self.streams.values().filter_map(|s| s.deadline).min()
    }

    /// Release the pending bytes of streams whose deadline has passed.
    fn release_expired(&mut self, now: Instant) {
        self.release_where(|target| target.deadline.is_some_and(|at| at <= now));
    }

    /// Resolve every stream's pending bytes, abandoning partial matches.
    fn release_pending(&mut self) {
        self.release_where(|_| true);
    }

    fn release_where(&mut self, mut due: impl FnMut(&Stream) -> bool) {
        let Self {
            streams,
            error,
            scratch,
            ..
        } = self;

        for (id, target) in streams.iter_mut() {
            if !due(target) {
                continue;
            }
            target.deadline = None;
            if target.coordinator.is_idle() {
                continue;
            }
            tracing::trace!(
                stream = *id,
                pending = target.coordinator.pending_len(),
                "releasing pending bytes"
            );
            scratch.clear();
            target.coordinator.force_flush(scratch);
            forward(target.sink.as_mut(), scratch, error);
        }
    }

    fn flush_sinks(&mut self) {
        for target in self.streams.values_mut() {
            if self.error.is_some() {
                return;
            }
            if let Err(err) = target.sink.flush() {
                tracing::warn!(error = %err, "sink flush failed; further output is dropped");
                self.error = Some(err);
            }
        }
    }

    fn latched_error(&self) -> Option<io::Error> {
        self.error
            .as_ref()
            .map(|err| io::Error::new(err.kind(), err.to_string()))
    }
}

/// Write resolved output unless the pump is already poisoned.
fn forward(sink: &mut dyn Write, bytes: &[u8], error: &mut Option<io::Error>) {
    if bytes.is_empty() {
        return;
    }
    if error.is_some() {
        tracing::trace!(len = bytes.len(), "sink failed earlier, dropping output");
        return;
    }
    // Flushed per write so line-buffered sinks such as stdout show partial lines.
    if let Err(err) = sink.write_all(bytes).and_then(|()| sink.flush()) {
        tracing::warn!(error = %err, "sink write failed; further output is dropped");
        *error = Some(err);
    }
}

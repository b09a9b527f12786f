//! Streaming secret redaction.
//!
//! A [`Masker`] sits between a program's output and its real destination
//! and replaces every registered secret with a fixed mask before it reaches
//! the sink, no matter how the output is chunked.
//!
//! - [`Pattern`] / [`SequenceMatcher`] - per-secret streaming automaton
//! - [`MatchCoordinator`] - decides which bytes are masked, released, or held
//! - [`Masker`] - owns the background pump and hands out [`MaskedWriter`]s
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use std::io::Write;
//! use secret_mask::masker::Masker;
//!
//! let masker = Masker::new([b"hunter2".to_vec()], "[REDACTED]", Duration::from_secs(1)).unwrap();
//! let sink = tempfile::NamedTempFile::new().unwrap();
//! let mut writer = masker.new_writer(sink.reopen().unwrap());
//! masker.spawn().unwrap();
//!
//! writer.write_all(b"password: hunter2\n").unwrap();
//! masker.close().unwrap();
//!
//! let written = std::fs::read_to_string(sink.path()).unwrap();
//! assert_eq!(written, "password: [REDACTED]\n");
//! ```

pub mod coordinator;
pub mod matcher;
mod pump;

pub use coordinator::MatchCoordinator;
pub use matcher::{Pattern, SequenceMatcher};

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::{MaskError, Result};
use pump::{Message, Reply, StreamId, StreamPump};

/// Immutable settings shared by every stream of a [`Masker`].
#[derive(Debug, Clone)]
pub struct MaskerConfig {
    /// Secrets to mask, in registration order.
    pub patterns: Vec<Pattern>,
    /// Replacement written in place of each masked occurrence.
    pub mask: Arc<[u8]>,
    /// How long the pump waits for more data before releasing a partial match.
    pub flush_timeout: Duration,
}

impl MaskerConfig {
    /// Build a config from raw secret values.
    ///
    /// An empty pattern list is accepted and yields pass-through behavior.
    pub fn new<I, B>(patterns: I, mask: impl AsRef<[u8]>, flush_timeout: Duration) -> Result<Self>
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        Ok(Self {
            patterns: Pattern::from_many(patterns)?,
            mask: mask.as_ref().into(),
            flush_timeout,
        })
    }

    /// Length of the longest registered pattern, 0 if there are none.
    pub fn longest_pattern(&self) -> usize {
        self.patterns.iter().map(Pattern::len).max().unwrap_or(0)
    }
}

/// Handle to a masking pipeline.
///
/// Writers created with [`Masker::new_writer`] enqueue copies of their data;
/// a single pump, started with [`Masker::run`] or [`Masker::spawn`], does all
/// matching and writes to the sinks.
pub struct Masker {
    config: Arc<MaskerConfig>,
    tx: Sender<Message>,
    rx: Mutex<Option<Receiver<Message>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    next_stream: AtomicUsize,
}

impl Masker {
    /// Create a masker for the given secrets.
    ///
    /// Fails with [`MaskError::EmptyPattern`] if any secret is empty.
    pub fn new<I, B>(patterns: I, mask: impl AsRef<[u8]>, flush_timeout: Duration) -> Result<Self>
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        Ok(Self::from_config(MaskerConfig::new(
            patterns,
            mask,
            flush_timeout,
        )?))
    }

    /// Create a masker from a prepared config.
    pub fn from_config(config: MaskerConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            config: Arc::new(config),
            tx,
            rx: Mutex::new(Some(rx)),
            worker: Mutex::new(None),
            next_stream: AtomicUsize::new(0),
        }
    }

    /// The immutable configuration.
    pub fn config(&self) -> &MaskerConfig {
        &self.config
    }

    /// Create a writer whose masked output goes to `sink`.
    ///
    /// Each writer is an independent stream: a secret split across two
    /// writers is not reassembled.
    pub fn new_writer<W>(&self, sink: W) -> MaskedWriter
    where
        W: Write + Send + 'static,
    {
        let stream = self.next_stream.fetch_add(1, Ordering::Relaxed);
        if self
            .tx
            .send(Message::Attach {
                stream,
                sink: Box::new(sink),
            })
            .is_err()
        {
            tracing::debug!(stream, "writer created after the masker was closed");
        }
        MaskedWriter {
            tx: self.tx.clone(),
            stream,
        }
    }

    /// Run the pump on the current thread until [`Masker::close`] is called
    /// or every handle is dropped.
    ///
    /// May only be called once; later calls (or a call after
    /// [`Masker::spawn`]) return [`MaskError::AlreadyRunning`].
    pub fn run(&self) -> Result<()> {
        let rx = self.take_receiver()?;
        StreamPump::new(Arc::clone(&self.config)).run(rx);
        Ok(())
    }

    /// Run the pump on a dedicated background thread.
    pub fn spawn(&self) -> Result<()> {
        let rx = self.take_receiver()?;
        let pump = StreamPump::new(Arc::clone(&self.config));
        let handle = thread::Builder::new()
            .name("secret-mask-pump".to_string())
            .spawn(move || pump.run(rx))?;
        *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        Ok(())
    }

    /// Block until every byte written so far has been resolved and handed
    /// to its sink.
    ///
    /// Pending partial matches are released literally, exactly as when the
    /// flush timeout expires. Returns the first sink error, if one occurred.
    pub fn flush(&self) -> Result<()> {
        request(&self.tx, |reply| Message::Flush { reply })
    }

    /// Flush everything, stop the pump, and wait for it to exit.
    ///
    /// If the pump was never started, the queued data is processed on the
    /// calling thread. Writers used after this return `BrokenPipe`.
    pub fn close(&self) -> Result<()> {
        let (reply, reply_rx) = mpsc::channel();
        self.tx
            .send(Message::Close { reply })
            .map_err(|_| MaskError::PumpStopped)?;

        if let Ok(rx) = self.take_receiver() {
            StreamPump::new(Arc::clone(&self.config)).run(rx);
        }

        let outcome = reply_rx.recv().map_err(|_| MaskError::PumpStopped);

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = worker {
            if handle.join().is_err() {
                tracing::warn!("stream pump panicked");
            }
        }

        match outcome? {
            Some(err) => Err(MaskError::Sink(err)),
            None => Ok(()),
        }
    }

    fn take_receiver(&self) -> Result<Receiver<Message>> {
        self.rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(MaskError::AlreadyRunning)
    }
}

impl std::fmt::Debug for Masker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Masker")
            .field("patterns", &self.config.patterns.len())
            .field("flush_timeout", &self.config.flush_timeout)
            .finish_non_exhaustive()
    }
}

fn request(tx: &Sender<Message>, make: impl FnOnce(Reply) -> Message) -> Result<()> {
    let (reply, reply_rx) = mpsc::channel();
    tx.send(make(reply)).map_err(|_| MaskError::PumpStopped)?;
    match reply_rx.recv() {
        Ok(None) => Ok(()),
        Ok(Some(err)) => Err(MaskError::Sink(err)),
        Err(_) => Err(MaskError::PumpStopped),
    }
}

/// Producer-side handle of one masked stream.
///
/// `write` copies the data, enqueues it, and returns immediately; it never
/// reports sink failures. Those surface through `flush`, which blocks until
/// the pump has written everything enqueued before it.
#[derive(Debug, Clone)]
pub struct MaskedWriter {
    tx: Sender<Message>,
    stream: StreamId,
}

impl Write for MaskedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.tx
            .send(Message::Data {
                stream: self.stream,
                bytes: buf.to_vec(),
            })
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "masker has been closed"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match request(&self.tx, |reply| Message::Flush { reply }) {
            Ok(()) => Ok(()),
            Err(MaskError::Sink(err)) => Err(err),
            Err(err) => Err(io::Error::new(io::ErrorKind::BrokenPipe, err.to_string())),
        }
    }
}

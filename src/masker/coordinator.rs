//! Match coordination across all patterns of one stream.
//!
//! The [`MatchCoordinator`] feeds every byte to every [`SequenceMatcher`],
//! holds bytes whose fate is still undecided, and emits resolved output:
//! either the mask for a committed match or the literal bytes that can no
//! longer take part in one.
//!
//! Resolution follows "leftmost match, longest wins": a completed match is
//! only committed once no in-flight partial match could still start at or
//! before it, and completed matches overlapping a committed one are dropped.

use std::collections::VecDeque;
use std::sync::Arc;

use super::matcher::{Pattern, SequenceMatcher};

/// A completed occurrence waiting for a commit decision.
///
/// Positions are absolute stream indices, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    start: u64,
    end: u64,
    pattern: usize,
}

/// Resolves a byte stream into masked and literal output.
///
/// # Example
///
/// ```
/// use secret_mask::masker::{MatchCoordinator, Pattern};
///
/// let patterns = Pattern::from_many([b"foo".to_vec(), b"bar".to_vec()]).unwrap();
/// let mut coordinator = MatchCoordinator::new(&patterns, b"***".to_vec());
///
/// let mut out = Vec::new();
/// coordinator.push_all(b"test foo bar", &mut out);
/// coordinator.force_flush(&mut out);
/// assert_eq!(out, b"test *** ***");
/// ```
pub struct MatchCoordinator {
    matchers: Vec<SequenceMatcher>,
    mask: Arc<[u8]>,
    /// Undecided bytes, oldest first.
    pending: VecDeque<u8>,
    /// Stream index of `pending.front()`.
    pending_start: u64,
    /// Stream index the next pushed byte will get.
    next_index: u64,
    candidates: Vec<Candidate>,
    masked: u64,
}

// Pending bytes may hold part of a secret, so only sizes are shown.
impl std::fmt::Debug for MatchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchCoordinator")
            .field("patterns", &self.matchers.len())
            .field("pending", &self.pending.len())
            .field("candidates", &self.candidates.len())
            .field("bytes_seen", &self.next_index)
            .field("masked", &self.masked)
            .finish()
    }
}

impl MatchCoordinator {
    /// Create a coordinator with one matcher per pattern.
    pub fn new(patterns: &[Pattern], mask: impl Into<Arc<[u8]>>) -> Self {
        Self {
            matchers: patterns.iter().cloned().map(SequenceMatcher::new).collect(),
            mask: mask.into(),
            pending: VecDeque::new(),
            pending_start: 0,
            next_index: 0,
            candidates: Vec::new(),
            masked: 0,
        }
    }

    /// Process one byte, appending any resolved output to `out`.
    pub fn push(&mut self, byte: u8, out: &mut Vec<u8>) {
        let index = self.next_index;
        self.next_index += 1;
        self.pending.push_back(byte);
        feed_matchers(&mut self.matchers, &mut self.candidates, index, byte);
        self.resolve(out);
    }

    /// Process a chunk one byte at a time.
    pub fn push_all(&mut self, bytes: &[u8], out: &mut Vec<u8>) {
        if self.matchers.is_empty() && self.pending.is_empty() {
            out.extend_from_slice(bytes);
            self.next_index += bytes.len() as u64;
            self.pending_start = self.next_index;
            return;
        }
        for &byte in bytes {
            self.push(byte, out);
        }
    }

    /// Resolve everything that is pending.
    ///
    /// In-flight partial matches are abandoned. Matches that already
    /// completed are still masked; every other pending byte is released
    /// literally.
    pub fn force_flush(&mut self, out: &mut Vec<u8>) {
        // A commit rescans what follows it, which can start new partial
        // matches; those are abandoned too.
        loop {
            for matcher in &mut self.matchers {
                matcher.reset();
            }
            self.resolve(out);
            if self.pending.is_empty() {
                break;
            }
        }
        debug_assert!(self.candidates.is_empty());
    }

    /// Number of bytes currently held back.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is held back.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Total number of bytes pushed so far.
    pub fn bytes_seen(&self) -> u64 {
        self.next_index
    }

    /// Number of mask tokens emitted so far.
    pub fn masked_count(&self) -> u64 {
        self.masked
    }

    /// Lowest implied start among matchers with partial progress.
    fn min_active_start(&self) -> Option<u64> {
        self.matchers
            .iter()
            .filter(|m| m.is_active())
            .map(|m| self.next_index - m.progress() as u64)
            .min()
    }

    /// Leftmost candidate, longest on ties.
    fn best_candidate(&self) -> Option<Candidate> {
        self.candidates
            .iter()
            .copied()
            .min_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)))
    }

    fn resolve(&mut self, out: &mut Vec<u8>) {
        loop {
            let active_start = self.min_active_start();
            let best = self.best_candidate();

            if let Some(candidate) = best {
                if active_start.is_none_or(|start| candidate.end < start) {
                    self.commit(candidate, out);
                    continue;
                }
            }

            let horizon = [active_start, best.map(|c| c.start)]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(self.next_index);
            self.release_until(horizon, out);
            return;
        }
    }

    fn commit(&mut self, candidate: Candidate, out: &mut Vec<u8>) {
        debug_assert!(candidate.start >= self.pending_start);
        self.release_until(candidate.start, out);

        let len = (candidate.end + 1 - self.pending_start) as usize;
        self.pending.drain(..len);
        self.pending_start = candidate.end + 1;
        out.extend_from_slice(&self.mask);
        self.masked += 1;

        tracing::trace!(
            pattern = candidate.pattern,
            start = candidate.start,
            len,
            "masked occurrence"
        );

        self.rescan_pending();
    }

    /// Rebuild matcher state and candidates from the bytes still pending.
    ///
    /// Matchers restart after each full match, so occurrences overlapping a
    /// discarded candidate were never seen. Everything pending lies after
    /// the committed span and is fed again from a clean state.
    fn rescan_pending(&mut self) {
        for matcher in &mut self.matchers {
            matcher.reset();
        }
        self.candidates.clear();

        let Self {
            matchers,
            candidates,
            pending,
            pending_start,
            ..
        } = self;
        for (offset, &byte) in pending.iter().enumerate() {
            feed_matchers(matchers, candidates, *pending_start + offset as u64, byte);
        }
    }

    /// Emit pending bytes with a stream index below `horizon` literally.
    fn release_until(&mut self, horizon: u64, out: &mut Vec<u8>) {
        if horizon <= self.pending_start {
            return;
        }
        let count = ((horizon - self.pending_start) as usize).min(self.pending.len());
        out.extend(self.pending.drain(..count));
        self.pending_start += count as u64;
    }
}

/// Feed the byte at stream `index` to every matcher, recording completions.
fn feed_matchers(
    matchers: &mut [SequenceMatcher],
    candidates: &mut Vec<Candidate>,
    index: u64,
    byte: u8,
) {
    for (pattern, matcher) in matchers.iter_mut().enumerate() {
        let len = matcher.feed(byte);
        if len > 0 {
            candidates.push(Candidate {
                start: index + 1 - len as u64,
                end: index,
                pattern,
            });
        }
    }
}

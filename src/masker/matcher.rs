//! Per-pattern streaming matcher.
//!
//! Each registered secret gets its own [`SequenceMatcher`], a Knuth-Morris-Pratt
//! automaton that consumes one byte at a time and reports when a full
//! occurrence of its pattern has just ended.

use std::sync::Arc;

use crate::error::{MaskError, Result};

/// An immutable byte sequence to be masked, with its prefix-function table.
///
/// Cloning is cheap: the bytes and table are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct Pattern {
    bytes: Arc<[u8]>,
    /// `prefix[k]` is the length of the longest proper prefix of
    /// `bytes[..=k]` that is also a suffix of it.
    prefix: Arc<[usize]>,
}

impl Pattern {
    /// Create a pattern from raw bytes.
    ///
    /// Empty sequences are rejected, since they would match everywhere.
    ///
    /// # Example
    ///
    /// ```
    /// use secret_mask::masker::Pattern;
    ///
    /// let pattern = Pattern::new(b"hunter2".to_vec()).unwrap();
    /// assert_eq!(pattern.len(), 7);
    /// assert!(Pattern::new(Vec::new()).is_err());
    /// ```
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(MaskError::EmptyPattern { index: 0 });
        }
        let prefix = prefix_table(&bytes);
        Ok(Self {
            bytes: bytes.into(),
            prefix: prefix.into(),
        })
    }

    /// Build patterns from a list of byte sequences, reporting the index of
    /// the first empty one.
    pub fn from_many<I, B>(sequences: I) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        sequences
            .into_iter()
            .enumerate()
            .map(|(index, bytes)| {
                Self::new(bytes).map_err(|_| MaskError::EmptyPattern { index })
            })
            .collect()
    }

    /// The pattern bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes in the pattern.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`; empty patterns cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Secret material must not end up in logs through `{:?}`.
impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pattern")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

fn prefix_table(bytes: &[u8]) -> Vec<usize> {
    let mut table = vec![0; bytes.len()];
    let mut k = 0;
    for i in 1..bytes.len() {
        while k > 0 && bytes[i] != bytes[k] {
            k = table[k - 1];
        }
        if bytes[i] == bytes[k] {
            k += 1;
        }
        table[i] = k;
    }
    table
}

/// Streaming matcher state for a single [`Pattern`].
///
/// # Example
///
/// ```
/// use secret_mask::masker::{Pattern, SequenceMatcher};
///
/// let mut matcher = SequenceMatcher::new(Pattern::new(b"foo".to_vec()).unwrap());
/// let hits: Vec<usize> = b"a foo"
///     .iter()
///     .map(|&b| matcher.feed(b))
///     .collect();
/// assert_eq!(hits, vec![0, 0, 0, 0, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    pattern: Pattern,
    /// Number of pattern bytes currently matched in sequence.
    matched: usize,
}

impl SequenceMatcher {
    /// Create a matcher for the given pattern.
    pub fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            matched: 0,
        }
    }

    /// Advance by one byte.
    ///
    /// Returns the pattern length when a full occurrence ends at this byte,
    /// otherwise 0. After a full match the matcher starts over, so repeated
    /// occurrences of the same pattern are consumed without overlap.
    pub fn feed(&mut self, byte: u8) -> usize {
        let bytes = self.pattern.as_bytes();
        while self.matched > 0 && bytes[self.matched] != byte {
            self.matched = self.pattern.prefix[self.matched - 1];
        }
        if bytes[self.matched] == byte {
            self.matched += 1;
        }
        if self.matched == bytes.len() {
            self.matched = 0;
            return bytes.len();
        }
        0
    }

    /// Forget any partial progress.
    pub fn reset(&mut self) {
        self.matched = 0;
    }

    /// Number of pattern bytes currently matched.
    pub fn progress(&self) -> usize {
        self.matched
    }

    /// Whether a partial match is in flight.
    pub fn is_active(&self) -> bool {
        self.matched > 0
    }

    /// The pattern this matcher tracks.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}

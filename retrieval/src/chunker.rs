//! Overlapping word-window chunking
//!
//! Splits text on whitespace and emits windows of `chunk_size` words that
//! advance by `chunk_size - overlap` words (never less than one).

/// Default window size in words
pub const DEFAULT_CHUNK_SIZE: usize = 300;
/// Default number of words shared by neighbouring windows
pub const DEFAULT_CHUNK_OVERLAP: usize = 60;

/// Word-window splitter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSplitter {
    /// Words per window
    pub chunk_size: usize,
    /// Words shared with the previous window
    pub overlap: usize,
}

impl Default for ChunkSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkSplitter {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Distance in words between the starts of consecutive windows
    pub fn step(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap).max(1)
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        chunk_text(text, self.chunk_size, self.overlap)
    }
}

/// Split `text` into overlapping windows of whitespace-separated words
///
/// The last window may be shorter than `chunk_size`. Splitting stops as soon
/// as a window reaches the end of the text, so no trailing window repeats
/// words that an earlier window already ended on.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < words.len() {
        let end = start.saturating_add(chunk_size);
        let piece = words[start..end.min(words.len())].join(" ");
        if !piece.is_empty() {
            chunks.push(piece);
        }
        if end >= words.len() {
            break;
        }
        start += step;
    }

    chunks
}

//! Document chunking.
//!
//! Uploaded text is split into overlapping fixed-size windows before
//! embedding. Window offsets are counted in `char`s so a window boundary never
//! falls inside a multi-byte code point.

use crate::error::{RagError, Result};

/// A strategy for splitting raw document text into chunk texts.
///
/// Implementations return an empty `Vec` for empty input.
pub trait Chunker: Send + Sync {
    /// Split text into ordered chunk texts.
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Splits text into fixed-size windows by character count with overlap.
///
/// Each window starts `chunk_size - chunk_overlap` characters after the
/// previous one; the last window is clipped to the end of the text.
///
/// # Example
///
/// ```rust
/// use oriana_rag::chunking::{Chunker, FixedSizeChunker};
///
/// let chunker = FixedSizeChunker::new(4, 1).unwrap();
/// assert_eq!(chunker.chunk("abcdefg"), vec!["abcd", "defg", "g"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] unless `chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

impl Default for FixedSizeChunker {
    fn default() -> Self {
        Self { chunk_size: 500, chunk_overlap: 50 }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        split_windows(text, self.chunk_size, self.chunk_overlap)
    }
}

/// Split `text` into windows of `size` characters overlapping by `overlap`.
///
/// # Errors
///
/// Returns [`RagError::ConfigError`] if `overlap >= size`; such a step would
/// never advance.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Result<Vec<String>> {
    validate(size, overlap)?;
    Ok(split_windows(text, size, overlap))
}

fn validate(size: usize, overlap: usize) -> Result<()> {
    if overlap >= size {
        return Err(RagError::ConfigError(format!(
            "chunk_overlap ({overlap}) must be less than chunk_size ({size})"
        )));
    }
    Ok(())
}

/// Caller guarantees `overlap < size`.
fn split_windows(text: &str, size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    // Byte offset of every char boundary, including the end of the text.
    let boundaries: Vec<usize> =
        text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
    let char_len = boundaries.len() - 1;
    let step = size - overlap;

    let mut chunks = Vec::with_capacity(char_len.div_ceil(step));
    let mut start = 0;
    while start < char_len {
        let end = start.saturating_add(size).min(char_len);
        chunks.push(text[boundaries[start]..boundaries[end]].to_string());
        start = start.saturating_add(step);
    }
    chunks
}

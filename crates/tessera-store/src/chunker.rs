//! Fixed-size character windows with overlap.

use crate::error::{Result, StoreError};

/// Character-window splitter.
///
/// Sizes are counted in `char`s, never bytes, so windows always fall on UTF-8
/// boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    size: usize,
    overlap: usize,
}

impl Chunker {
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if `size` is zero or `overlap >= size`.
    pub fn new(size: usize, overlap: usize) -> Result<Self> {
        if size == 0 {
            return Err(StoreError::Configuration(
                "chunk size must be greater than zero".into(),
            ));
        }
        if overlap >= size {
            return Err(StoreError::Configuration(format!(
                "chunk overlap ({overlap}) must be smaller than chunk size ({size})"
            )));
        }
        Ok(Self { size, overlap })
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into windows of at most `size` characters.
    ///
    /// Text that already fits is returned whole as a single chunk. Otherwise the
    /// window advances by `size - overlap` until its start reaches the end of the
    /// text; the last window may be shorter.
    #[must_use]
    pub fn chunk(&self, text: &str) -> Vec<String> {
        // byte offset of every char start, plus the end of the text
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let len = bounds.len() - 1;

        if len <= self.size {
            return vec![text.to_owned()];
        }

        let step = self.size - self.overlap;
        let mut chunks = Vec::with_capacity(len.div_ceil(step));
        let mut start = 0;
        while start < len {
            let end = (start + self.size).min(len);
            chunks.push(text[bounds[start]..bounds[end]].to_owned());
            start += step;
        }
        chunks
    }
}

/// One-shot form of [`Chunker::chunk`].
///
/// # Errors
///
/// Returns [`StoreError::Configuration`] if `overlap >= size` or `size` is zero.
pub fn chunk(text: &str, size: usize, overlap: usize) -> Result<Vec<String>> {
    Ok(Chunker::new(size, overlap)?.chunk(text))
}

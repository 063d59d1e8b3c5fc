//! Character-offset view over the shared annotated text.
//!
//! Spans address the text by character index. Rust strings are indexed by
//! byte, so slicing needs a char→byte table for non-ASCII input:
//!
//! ```text
//! Text:   "café au lait"
//! chars:   c a f é _ a u ...
//!          0 1 2 3 4 5 6
//! bytes:   0 1 2 3 5 6 7        ('é' is 2 bytes)
//! ```
//!
//! ASCII text takes the identity fast path and allocates no table.

/// Build a table where `map[char_idx]` is the byte offset of that char.
///
/// The final entry is `text.len()`, so `map[char_count]` is valid.
#[must_use]
pub fn build_char_to_byte_map(text: &str) -> Vec<usize> {
    let mut map: Vec<usize> = text.char_indices().map(|(byte_idx, _)| byte_idx).collect();
    map.push(text.len());
    map
}

/// Read-only text with O(1) character-range slicing.
#[derive(Debug, Clone)]
pub struct TextView<'a> {
    text: &'a str,
    char_to_byte: Vec<usize>,
    char_len: usize,
}

impl<'a> TextView<'a> {
    /// Create a view over `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        if text.is_ascii() {
            Self {
                text,
                char_to_byte: Vec::new(),
                char_len: text.len(),
            }
        } else {
            let char_to_byte = build_char_to_byte_map(text);
            let char_len = char_to_byte.len() - 1;
            Self {
                text,
                char_to_byte,
                char_len,
            }
        }
    }

    /// Length in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    fn byte_at(&self, char_idx: usize) -> usize {
        let char_idx = char_idx.min(self.char_len);
        if self.char_to_byte.is_empty() {
            char_idx
        } else {
            self.char_to_byte[char_idx]
        }
    }

    /// Text of `[start, end)` in characters, clamped to the text bounds.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let start = start.min(self.char_len);
        let end = end.clamp(start, self.char_len);
        &self.text[self.byte_at(start)..self.byte_at(end)]
    }

    /// Up to `width` characters immediately before `start`.
    #[must_use]
    pub fn left_context(&self, start: usize, width: usize) -> &'a str {
        let start = start.min(self.char_len);
        self.slice(start.saturating_sub(width), start)
    }

    /// Up to `width` characters immediately after `end`.
    #[must_use]
    pub fn right_context(&self, end: usize, width: usize) -> &'a str {
        self.slice(end, end.saturating_add(width))
    }
}

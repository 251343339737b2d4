use std::ops::Index;

use crate::error::{Error, Result};

/// The stock prompt: two pangrams back to back.
pub const DEFAULT_WORDS: &str =
    "the quick brown fox jumps over the lazy dog pack my box with five dozen liquor jugs";

/// Ordered, immutable sequence of target words. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.is_empty() {
            return Err(Error::EmptyWordList);
        }
        Ok(Self { words })
    }

    /// Split `text` on whitespace. Fails if nothing but whitespace is given.
    pub fn from_text(text: &str) -> Result<Self> {
        Self::new(text.split_whitespace())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing clippy expects.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.words.get(idx).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl Default for WordList {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.split_whitespace().map(String::from).collect(),
        }
    }
}

impl Index<usize> for WordList {
    type Output = str;

    fn index(&self, idx: usize) -> &str {
        &self.words[idx]
    }
}

//! Rotating substitution cipher.
//!
//! ASP obfuscates the method field of every request and the body of every
//! successful response with a Caesar rotation keyed per request. Only ASCII
//! letters rotate; case is preserved and every other character passes
//! through untouched, so `decode(encode(t, k), k) == t` for any text.
//!
//! The cipher only accepts a [`Key`], which cannot hold a value outside
//! 1..=25. Range checks happen once, at header validation.

use std::fmt;

/// Number of letters in the rotation alphabet.
const ALPHABET_LEN: u8 = 26;

/// A validated cipher key in `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(u8);

impl Key {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 25;

    /// Returns `None` when `raw` is outside 1..=25.
    pub fn new(raw: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&raw).then_some(Self(raw))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rotate every letter of `text` forward by `key`.
pub fn encode(text: &str, key: Key) -> String {
    rotate_text(text, key.0)
}

/// Rotate every letter of `text` backward by `key`. Inverse of [`encode`].
pub fn decode(text: &str, key: Key) -> String {
    rotate_text(text, ALPHABET_LEN - key.0)
}

fn rotate_text(text: &str, by: u8) -> String {
    text.chars().map(|c| rotate_char(c, by)).collect()
}

fn rotate_char(c: char, by: u8) -> char {
    let base = match c {
        'a'..='z' => b'a',
        'A'..='Z' => b'A',
        _ => return c,
    };
    let offset = c as u8 - base;
    (base + (offset + by) % ALPHABET_LEN) as char
}

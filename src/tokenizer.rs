//! Byte-level text normalization.
//!
//! Tokens are single normalized bytes from the alphabet `[0-9a-z]`. Whitespace,
//! control characters, ASCII punctuation and every non-ASCII byte are dropped,
//! and upper-case letters are folded to lower case. Each token remembers the
//! byte offset it came from so a window can be located in the source later.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub symbol: u8,
    /// Byte offset of the source byte in the document.
    pub offset: usize,
}

/// Map a raw byte to its normalized token symbol, or `None` if it is skipped.
pub fn normalize_byte(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' | b'a'..=b'z' => Some(byte),
        b'A'..=b'Z' => Some(byte.to_ascii_lowercase()),
        _ => None,
    }
}

/// Lazy token stream over a document. Cheap to clone; a clone continues from
/// the same position, `Tokenizer::new` starts over.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        while self.pos < self.bytes.len() {
            let offset = self.pos;
            self.pos += 1;
            if let Some(symbol) = normalize_byte(self.bytes[offset]) {
                return Some(Token { symbol, offset });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.bytes.len() - self.pos))
    }
}

/// Tokenize a whole document eagerly.
pub fn tokenize(bytes: &[u8]) -> Vec<Token> {
    Tokenizer::new(bytes).collect()
}

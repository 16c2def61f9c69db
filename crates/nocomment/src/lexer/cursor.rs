/// Low-level rune reader over a byte buffer.
///
/// Tracks the scan position, the start of the pending token, and the width
/// of the last decoded rune so a single [`Cursor::backup`] is always
/// possible after [`Cursor::next`].
pub struct Cursor<'src> {
    input: &'src [u8],
    /// Byte offset of the *next* rune to be consumed.
    pos: usize,
    /// Byte offset where the pending token began.
    start: usize,
    /// Width in bytes of the last rune returned by `next`; 0 at end of input.
    width: usize,
}

impl<'src> Cursor<'src> {
    pub fn new(input: &'src [u8]) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
            width: 0,
        }
    }

    /// Current scan position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Consume and return the next rune.
    ///
    /// Invalid UTF-8 decodes as U+FFFD with a width of one byte.
    pub fn next(&mut self) -> Option<char> {
        match decode_rune(&self.input[self.pos..]) {
            Some((ch, width)) => {
                self.width = width;
                self.pos += width;
                Some(ch)
            }
            None => {
                self.width = 0;
                None
            }
        }
    }

    /// Step back over the rune returned by the last `next`. Only valid once
    /// per call of `next`.
    pub fn backup(&mut self) {
        self.pos -= self.width;
        self.width = 0;
    }

    /// Peek at the next rune without consuming it.
    pub fn peek(&mut self) -> Option<char> {
        let ch = self.next();
        self.backup();
        ch
    }

    /// Consume the next rune if it matches `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        match self.next() {
            Some(ch) if ch == expected => true,
            Some(_) => {
                self.backup();
                false
            }
            None => false,
        }
    }

    /// True if the unscanned input begins with `prefix`.
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Skip `n` bytes. Callers only skip over ASCII delimiters they have
    /// already matched, so `n` never splits a rune.
    pub fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
        self.width = 0;
    }

    /// Move the cursor to the end of the input.
    pub fn skip_to_end(&mut self) {
        self.pos = self.input.len();
        self.width = 0;
    }

    /// Offset of `needle` relative to the current position, if present.
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        self.rest()
            .windows(needle.len())
            .position(|window| window == needle)
    }

    /// True if a `byte` occurs anywhere after the current position.
    pub fn occurs_after(&self, byte: u8) -> bool {
        self.input
            .get(self.pos + 1..)
            .is_some_and(|tail| tail.contains(&byte))
    }

    /// The unscanned remainder of the input.
    pub fn rest(&self) -> &'src [u8] {
        &self.input[self.pos..]
    }

    /// True if runes have been consumed since the last token boundary.
    pub fn has_pending(&self) -> bool {
        self.pos > self.start
    }

    /// Close the pending token: returns its start offset and bytes, and
    /// begins a new token at the current position.
    pub fn take(&mut self) -> (usize, &'src [u8]) {
        let start = self.start;
        self.start = self.pos;
        (start, &self.input[start..self.pos])
    }
}

/// Decode the first rune of `bytes`, returning it with its width.
fn decode_rune(bytes: &[u8]) -> Option<(char, usize)> {
    let first = *bytes.first()?;
    let width = match first {
        0x00..=0x7F => return Some((first as char, 1)),
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => return Some((char::REPLACEMENT_CHARACTER, 1)),
    };
    match bytes
        .get(..width)
        .and_then(|rune| std::str::from_utf8(rune).ok())
        .and_then(|s| s.chars().next())
    {
        Some(ch) => Some((ch, width)),
        None => Some((char::REPLACEMENT_CHARACTER, 1)),
    }
}

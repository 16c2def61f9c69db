/// Source position within an input (1-based line/column, 0-based byte offset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number, counted in bytes.
    pub column: u32,
    /// 0-based byte offset from start of input.
    pub offset: usize,
}

impl Position {
    /// Resolve a byte offset into a line/column position.
    ///
    /// A `\r\n` pair or a lone `\r` count as one line break, matching the
    /// line terminators the lexer recognizes. Offsets past the end of
    /// `source` are clamped.
    pub fn locate(source: &[u8], offset: usize) -> Self {
        let offset = offset.min(source.len());
        let mut line = 1;
        let mut line_start = 0;
        let mut i = 0;
        while i < offset {
            match source[i] {
                b'\n' => {
                    line += 1;
                    line_start = i + 1;
                }
                b'\r' => {
                    if source.get(i + 1) == Some(&b'\n') && i + 1 < offset {
                        i += 1;
                    }
                    line += 1;
                    line_start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }
        Self {
            line,
            column: (offset - line_start) as u32 + 1,
            offset,
        }
    }
}

/// A byte range in an input, from `start` (inclusive) to `end` (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

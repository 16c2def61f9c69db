use std::borrow::Cow;
use std::fmt;

use nocomment_common::{LexError, Span};

/// A contiguous, typed slice of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    /// Byte offset of the first byte of `text` in the input.
    pub offset: usize,
    /// The exact input bytes covered by the token, delimiters included.
    pub text: &'src [u8],
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, offset: usize, text: &'src [u8]) -> Self {
        Self { kind, offset, text }
    }

    pub fn eof(offset: usize) -> Self {
        Self {
            kind: TokenKind::Eof,
            offset,
            text: &[],
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.offset, self.offset + self.text.len())
    }

    /// The token text, with invalid UTF-8 replaced.
    pub fn text_lossy(&self) -> Cow<'src, str> {
        String::from_utf8_lossy(self.text)
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "EOF"),
            TokenKind::Error(err) => write!(f, "{}", err),
            kind => write!(f, "{}({:?})", kind, self.text_lossy()),
        }
    }
}

/// Classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Anything outside comments and quotes.
    Text,
    /// `// ...` up to and including the line terminator.
    CppComment,
    /// `# ...` up to and including the line terminator.
    ShellComment,
    /// `/* ... */`
    BlockComment,
    /// `"..."`, quotes included.
    QuotedText,
    Eof,
    Error(LexError),
}

impl TokenKind {
    /// True for the kinds that end a token stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TokenKind::Eof | TokenKind::Error(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Text => "text",
            TokenKind::CppComment => "cpp_comment",
            TokenKind::ShellComment => "shell_comment",
            TokenKind::BlockComment => "block_comment",
            TokenKind::QuotedText => "quoted_text",
            TokenKind::Eof => "eof",
            TokenKind::Error(_) => "error",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

use std::iter::FusedIterator;

use nocomment_common::{LexError, StripperConfig};

use super::cursor::Cursor;
use super::token::{Token, TokenKind};

const BLOCK_COMMENT_END: &[u8] = b"*/";

/// Which line-comment openers the lexer recognizes.
///
/// A disabled opener is scanned as ordinary text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LexerOptions {
    /// Treat `#` as text.
    pub ignore_hash: bool,
    /// Treat `//` as text.
    pub ignore_slash: bool,
}

impl From<StripperConfig> for LexerOptions {
    fn from(config: StripperConfig) -> Self {
        Self {
            ignore_hash: config.ignore_hash,
            ignore_slash: config.ignore_slash,
        }
    }
}

/// Delimiters recognized while scanning text, in match priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Slash,
    Hash,
    BlockStart,
    Quote,
}

impl Delimiter {
    const ALL: [Delimiter; 4] = [
        Delimiter::Slash,
        Delimiter::Hash,
        Delimiter::BlockStart,
        Delimiter::Quote,
    ];

    fn bytes(self) -> &'static [u8] {
        match self {
            Delimiter::Slash => b"//",
            Delimiter::Hash => b"#",
            Delimiter::BlockStart => b"/*",
            Delimiter::Quote => b"\"",
        }
    }
}

/// Pull-based comment lexer over a byte buffer.
///
/// Splits the input into text, comment and quoted-text tokens. Every byte
/// of the input belongs to exactly one token, so concatenating the tokens
/// of a successful scan gives back the input. The stream ends with a single
/// [`TokenKind::Eof`] or [`TokenKind::Error`] token; after that the lexer
/// keeps returning the same terminal token from [`Lexer::next_token`] and
/// `None` from the iterator.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    options: LexerOptions,
    finished: Option<Token<'src>>,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src [u8]) -> Self {
        Self::with_options(input, LexerOptions::default())
    }

    pub fn with_options(input: &'src [u8], options: LexerOptions) -> Self {
        Self {
            cursor: Cursor::new(input),
            options,
            finished: None,
        }
    }

    /// True once a terminal token has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    /// Tokenize the entire input, terminal token included.
    pub fn tokenize(self) -> Vec<Token<'src>> {
        self.collect()
    }

    /// Scan the next token.
    pub fn next_token(&mut self) -> Token<'src> {
        if let Some(token) = self.finished {
            return token;
        }
        let token = self.scan_text();
        if token.kind.is_terminal() {
            log::debug!("scan finished: {} at byte {}", token.kind, token.offset);
            self.finished = Some(token);
        }
        token
    }

    // ---------------------------------------------------------------
    // Text
    // ---------------------------------------------------------------

    /// Consume plain text up to the next enabled delimiter, or dispatch
    /// into the delimiter's sub-scanner when the cursor already sits on one.
    fn scan_text(&mut self) -> Token<'src> {
        loop {
            if let Some(delimiter) = self.match_delimiter() {
                if self.cursor.has_pending() {
                    return self.emit(TokenKind::Text);
                }
                return match delimiter {
                    Delimiter::Slash => self.scan_line_comment(delimiter, TokenKind::CppComment),
                    Delimiter::Hash => self.scan_line_comment(delimiter, TokenKind::ShellComment),
                    Delimiter::BlockStart => self.scan_block_comment(),
                    Delimiter::Quote => self.scan_quoted(),
                };
            }
            if self.cursor.next().is_none() {
                if self.cursor.has_pending() {
                    return self.emit(TokenKind::Text);
                }
                return Token::eof(self.cursor.pos());
            }
        }
    }

    fn match_delimiter(&self) -> Option<Delimiter> {
        Delimiter::ALL
            .into_iter()
            .filter(|delimiter| self.is_enabled(*delimiter))
            .find(|delimiter| self.cursor.starts_with(delimiter.bytes()))
    }

    fn is_enabled(&self, delimiter: Delimiter) -> bool {
        match delimiter {
            Delimiter::Slash => !self.options.ignore_slash,
            Delimiter::Hash => !self.options.ignore_hash,
            Delimiter::BlockStart | Delimiter::Quote => true,
        }
    }

    // ---------------------------------------------------------------
    // Comments
    // ---------------------------------------------------------------

    /// Line comments run to the end of the line; `\n`, `\r\n` and a lone
    /// `\r` all end a line and belong to the comment.
    fn scan_line_comment(&mut self, opener: Delimiter, kind: TokenKind) -> Token<'src> {
        self.cursor.skip(opener.bytes().len());
        loop {
            match self.cursor.next() {
                Some('\n') | None => break,
                Some('\r') => {
                    self.cursor.eat('\n');
                    break;
                }
                Some(_) => {}
            }
        }
        self.emit(kind)
    }

    /// Block comments run through the first `*/` after the opener and may
    /// span lines. They do not nest.
    fn scan_block_comment(&mut self) -> Token<'src> {
        let opened_at = self.cursor.pos();
        self.cursor.skip(Delimiter::BlockStart.bytes().len());
        match self.cursor.find(BLOCK_COMMENT_END) {
            Some(len) => {
                self.cursor.skip(len + BLOCK_COMMENT_END.len());
                self.emit(TokenKind::BlockComment)
            }
            None => self.fail(LexError::UnclosedBlockComment { offset: opened_at }),
        }
    }

    // ---------------------------------------------------------------
    // Quoted text
    // ---------------------------------------------------------------

    /// Scan a `"..."` span.
    ///
    /// Only `\\` and `\"` are escapes. A `\"` with no other `"` anywhere
    /// after it is a literal backslash followed by the closing quote, so
    /// `"c:\"` stays a complete string.
    fn scan_quoted(&mut self) -> Token<'src> {
        let opened_at = self.cursor.pos();
        self.cursor.skip(Delimiter::Quote.bytes().len());
        loop {
            match self.cursor.next() {
                None => {
                    return self.fail(LexError::UnterminatedQuotedString { offset: opened_at })
                }
                Some('\\') => match self.cursor.peek() {
                    Some('\\') => {
                        self.cursor.next();
                    }
                    Some('"') if self.cursor.occurs_after(b'"') => {
                        self.cursor.next();
                    }
                    _ => {}
                },
                Some('"') => break,
                Some(_) => {}
            }
        }
        self.emit(TokenKind::QuotedText)
    }

    // ---------------------------------------------------------------
    // Token construction
    // ---------------------------------------------------------------

    fn emit(&mut self, kind: TokenKind) -> Token<'src> {
        let (offset, text) = self.cursor.take();
        Token::new(kind, offset, text)
    }

    /// Produce an error token covering the rest of the input.
    fn fail(&mut self, err: LexError) -> Token<'src> {
        self.cursor.skip_to_end();
        let (offset, text) = self.cursor.take();
        Token::new(TokenKind::Error(err), offset, text)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Token<'src>> {
        if self.is_finished() {
            return None;
        }
        Some(self.next_token())
    }
}

impl FusedIterator for Lexer<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lex(source: &str) -> Vec<(TokenKind, &str)> {
        lex_with(source, LexerOptions::default())
    }

    fn lex_with(source: &str, options: LexerOptions) -> Vec<(TokenKind, &str)> {
        Lexer::with_options(source.as_bytes(), options)
            .map(|t| (t.kind, std::str::from_utf8(t.text).unwrap()))
            .collect()
    }

    fn lex_kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|(kind, _)| kind).collect()
    }

    use TokenKind::*;

    #[test]
    fn empty_source() {
        assert_eq!(lex(""), vec![(Eof, "")]);
    }

    #[test]
    fn just_text() {
        assert_eq!(lex("hello world"), vec![(Text, "hello world"), (Eof, "")]);
    }

    #[test]
    fn cpp_comment_includes_newline() {
        assert_eq!(
            lex("//this is a comment\nHello World\n"),
            vec![
                (CppComment, "//this is a comment\n"),
                (Text, "Hello World\n"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn line_comment_terminators() {
        assert_eq!(
            lex("#a\rb#c\r\nd#e"),
            vec![
                (ShellComment, "#a\r"),
                (Text, "b"),
                (ShellComment, "#c\r\n"),
                (Text, "d"),
                (ShellComment, "#e"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn mixed_comment_styles() {
        assert_eq!(
            lex("/* c */// cpp\nHello World# shell\n"),
            vec![
                (BlockComment, "/* c */"),
                (CppComment, "// cpp\n"),
                (Text, "Hello World"),
                (ShellComment, "# shell\n"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn multi_line_block_comment() {
        assert_eq!(
            lex("/*this\r\n is a\n comment\r*/Hello World\n"),
            vec![
                (BlockComment, "/*this\r\n is a\n comment\r*/"),
                (Text, "Hello World\n"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn block_comment_does_not_close_on_its_own_star() {
        assert_eq!(
            lex("/*/ x */y"),
            vec![(BlockComment, "/*/ x */"), (Text, "y"), (Eof, "")]
        );
    }

    #[test]
    fn block_comments_do_not_nest() {
        assert_eq!(
            lex("/* a /* b */ c */"),
            vec![(BlockComment, "/* a /* b */"), (Text, " c */"), (Eof, "")]
        );
    }

    #[test]
    fn slash_star_prefers_line_comment_when_doubled() {
        assert_eq!(lex_kinds("//* x */"), vec![CppComment, Eof]);
    }

    #[test]
    fn quoted_text_hides_delimiters() {
        assert_eq!(
            lex(r##"This is some text. "#This is not a comment // neither is this /* or this */" sooo, no comments!"##),
            vec![
                (Text, "This is some text. "),
                (QuotedText, r##""#This is not a comment // neither is this /* or this */""##),
                (Text, " sooo, no comments!"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn escaped_quote_inside_string() {
        assert_eq!(
            lex(r#""inline=dir \"  ""#),
            vec![(QuotedText, r#""inline=dir \"  ""#), (Eof, "")]
        );
    }

    #[test]
    fn trailing_backslash_before_closing_quote() {
        assert_eq!(
            lex(r#""inline=dir c:\""#),
            vec![(QuotedText, r#""inline=dir c:\""#), (Eof, "")]
        );
    }

    #[test]
    fn escaped_backslash_before_closing_quote() {
        assert_eq!(
            lex(r#"x "c:\\" y"#),
            vec![
                (Text, "x "),
                (QuotedText, r#""c:\\""#),
                (Text, " y"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn other_backslash_sequences_are_text() {
        assert_eq!(
            lex(r#""a\n\t\#b" # c"#),
            vec![
                (QuotedText, r#""a\n\t\#b""#),
                (Text, " "),
                (ShellComment, "# c"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn quote_spans_lines() {
        assert_eq!(lex_kinds("\"a\n// b\n\""), vec![QuotedText, Eof]);
    }

    #[test]
    fn quote_inside_comment_is_comment() {
        assert_eq!(
            lex("// \"not a string\nx"),
            vec![(CppComment, "// \"not a string\n"), (Text, "x"), (Eof, "")]
        );
    }

    #[test]
    fn unclosed_block_comment() {
        let tokens = Lexer::new(b"ab /* unterminated").tokenize();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, Text);
        assert_eq!(
            tokens[1].kind,
            Error(LexError::UnclosedBlockComment { offset: 3 })
        );
        assert_eq!(tokens[1].offset, 3);
        assert_eq!(tokens[1].text, b"/* unterminated");
    }

    #[test]
    fn unterminated_quoted_string() {
        let tokens = Lexer::new(b"\"unterminated").tokenize();
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![Error(LexError::UnterminatedQuotedString { offset: 0 })]
        );
    }

    #[test]
    fn lone_escaped_quote_is_closing_quote() {
        assert_eq!(lex(r#""\""#), vec![(QuotedText, r#""\""#), (Eof, "")]);
        assert_eq!(
            lex_kinds(r#""\"#),
            vec![Error(LexError::UnterminatedQuotedString { offset: 0 })]
        );
    }

    #[test]
    fn escaped_quote_looks_ahead_past_the_line() {
        // Any later `"` in the input, even in another string or a comment,
        // makes `\"` an escape.
        assert_eq!(
            lex(r#"x = "c:\"; y = "z";"#),
            vec![
                (Text, "x = "),
                (QuotedText, r#""c:\"; y = ""#),
                (Text, "z"),
                (Error(LexError::UnterminatedQuotedString { offset: 17 }), "\";"),
            ]
        );
        assert_eq!(
            lex(r#""c:\" // "q""#),
            vec![
                (QuotedText, r#""c:\" // ""#),
                (Text, "q"),
                (Error(LexError::UnterminatedQuotedString { offset: 11 }), "\""),
            ]
        );
        assert_eq!(
            lex("\"a \\\"\nb\""),
            vec![(QuotedText, "\"a \\\"\nb\""), (Eof, "")]
        );
    }

    #[test]
    fn ignore_both() {
        let options = LexerOptions {
            ignore_hash: true,
            ignore_slash: true,
        };
        assert_eq!(
            lex_with("//this is a comment\rHello World# another comment\r", options),
            vec![
                (Text, "//this is a comment\rHello World# another comment\r"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn ignore_slash_only() {
        let options = LexerOptions {
            ignore_hash: false,
            ignore_slash: true,
        };
        assert_eq!(
            lex_with("//this is a comment\rHello World# another comment\r", options),
            vec![
                (Text, "//this is a comment\rHello World"),
                (ShellComment, "# another comment\r"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn ignore_hash_only() {
        let options = LexerOptions {
            ignore_hash: true,
            ignore_slash: false,
        };
        assert_eq!(
            lex_with("//this is a comment\rHello World# another comment\r", options),
            vec![
                (CppComment, "//this is a comment\r"),
                (Text, "Hello World# another comment\r"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn ignore_slash_keeps_block_comments() {
        let options = LexerOptions {
            ignore_hash: false,
            ignore_slash: true,
        };
        assert_eq!(
            lex_with("a//b/*c*/", options),
            vec![(Text, "a//b"), (BlockComment, "/*c*/"), (Eof, "")]
        );
    }

    #[test]
    fn offsets_increase_and_cover_input() {
        let source = "int x; // note\n/* doc */ s = \"#x\"; # tail";
        let tokens = Lexer::new(source.as_bytes()).tokenize();
        let mut expected = 0;
        for token in &tokens {
            assert_eq!(token.offset, expected);
            expected += token.text.len();
        }
        assert_eq!(expected, source.len());
    }

    #[test]
    fn multibyte_text_around_comments() {
        assert_eq!(
            lex("héllo # ñ\n€"),
            vec![(Text, "héllo "), (ShellComment, "# ñ\n"), (Text, "€"), (Eof, "")]
        );
    }

    #[test]
    fn lexer_is_fused_after_terminal_token() {
        let mut lexer = Lexer::new(b"/* open");
        let first = lexer.next_token();
        assert!(first.kind.is_terminal());
        assert!(lexer.is_finished());
        assert_eq!(lexer.next_token(), first);
        assert_eq!(lexer.next(), None);

        let mut lexer = Lexer::new(b"x");
        assert_eq!(lexer.next().map(|t| t.kind), Some(Text));
        assert_eq!(lexer.next().map(|t| t.kind), Some(Eof));
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn options_from_config() {
        let config = StripperConfig::with_line_styles(true, false);
        let options = LexerOptions::from(config);
        assert!(options.ignore_hash);
        assert!(!options.ignore_slash);
    }
}

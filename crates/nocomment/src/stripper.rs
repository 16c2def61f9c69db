use nocomment_common::{LexError, StripperConfig};

use crate::lexer::{Lexer, LexerOptions, TokenKind};

/// Assembles the output of a scan, dropping the comment styles the config
/// does not keep.
///
/// A `Stripper` holds only its config, so one value can clean any number
/// of inputs, from any number of threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stripper {
    config: StripperConfig,
}

impl Stripper {
    pub fn new(config: StripperConfig) -> Self {
        Self { config }
    }

    /// Whether tokens of `kind` are copied to the output.
    pub fn keeps(&self, kind: TokenKind) -> bool {
        match kind {
            TokenKind::Text | TokenKind::QuotedText => true,
            TokenKind::CppComment => self.config.keep_cpp_comments,
            TokenKind::ShellComment => self.config.keep_shell_comments,
            TokenKind::BlockComment => self.config.keep_c_comments,
            TokenKind::Eof | TokenKind::Error(_) => false,
        }
    }

    /// Remove comments from `input`.
    ///
    /// On a lex error the output gathered so far is discarded and the
    /// error is returned unchanged.
    pub fn clean(&self, input: &[u8]) -> Result<Vec<u8>, LexError> {
        let mut output = Vec::with_capacity(input.len());
        let mut lexer = Lexer::with_options(input, LexerOptions::from(self.config));
        loop {
            let token = lexer.next_token();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Error(err) => {
                    log::debug!("{} after {} bytes of output", err, output.len());
                    return Err(err);
                }
                kind if self.keeps(kind) => {
                    log::trace!("keep {} at byte {}", kind, token.offset);
                    output.extend_from_slice(token.text);
                }
                kind => {
                    log::trace!("drop {} at byte {}", kind, token.offset);
                }
            }
        }
        Ok(output)
    }
}

/// Strip every comment style with the default settings.
///
/// If the input cannot be scanned (an unclosed `/*` or `"`), the input is
/// returned unmodified and a warning is logged. Use [`clean_fallible`] to
/// observe the error.
pub fn clean(input: &[u8]) -> Vec<u8> {
    clean_or_passthrough(input, StripperConfig::default())
}

/// Strip comments according to `config`, reporting scan errors.
pub fn clean_fallible(input: &[u8], config: StripperConfig) -> Result<Vec<u8>, LexError> {
    Stripper::new(config).clean(input)
}

/// Strip every recognized comment, treating `#` and/or `//` as plain text.
///
/// Falls back to the unmodified input on a scan error, like [`clean`].
pub fn clean_with_line_styles(input: &[u8], ignore_hash: bool, ignore_slash: bool) -> Vec<u8> {
    clean_or_passthrough(input, StripperConfig::with_line_styles(ignore_hash, ignore_slash))
}

fn clean_or_passthrough(input: &[u8], config: StripperConfig) -> Vec<u8> {
    match clean_fallible(input, config) {
        Ok(output) => output,
        Err(err) => {
            log::warn!("{}; returning input unmodified", err);
            input.to_vec()
        }
    }
}

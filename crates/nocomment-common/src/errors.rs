use thiserror::Error;

use crate::span::Span;

/// Errors that terminate a scan.
///
/// Both carry the byte offset of the delimiter that opened the construct
/// that was never closed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexError {
    #[error("unclosed block comment at byte {offset}")]
    UnclosedBlockComment { offset: usize },

    #[error("unterminated quoted string at byte {offset}")]
    UnterminatedQuotedString { offset: usize },
}

impl LexError {
    /// Byte offset of the opening delimiter.
    pub fn offset(&self) -> usize {
        match *self {
            LexError::UnclosedBlockComment { offset }
            | LexError::UnterminatedQuotedString { offset } => offset,
        }
    }

    /// Short description without the location.
    pub fn message(&self) -> &'static str {
        match self {
            LexError::UnclosedBlockComment { .. } => "unclosed block comment",
            LexError::UnterminatedQuotedString { .. } => "unterminated quoted string",
        }
    }

    /// Span from the opening delimiter to the end of an input of `input_len` bytes.
    pub fn span(&self, input_len: usize) -> Span {
        let start = self.offset().min(input_len);
        Span::new(start, input_len)
    }

    fn help(&self) -> &'static str {
        match self {
            LexError::UnclosedBlockComment { .. } => "block comments must be closed with `*/`",
            LexError::UnterminatedQuotedString { .. } => {
                "add a closing `\"`; only `\\\"` and `\\\\` are escapes inside quotes"
            }
        }
    }
}

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A renderable report: a failed scan, or a warning about the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Option<Span>,
    pub label: Option<String>,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span: None,
            label: None,
            suggestion: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            span: None,
            label: None,
            suggestion: None,
        }
    }

    /// Build a diagnostic for `err` raised while scanning `input_len` bytes.
    pub fn from_lex_error(err: &LexError, input_len: usize) -> Self {
        let opener = match err {
            LexError::UnclosedBlockComment { .. } => "comment opened here",
            LexError::UnterminatedQuotedString { .. } => "quote opened here",
        };
        Self::error(err.message())
            .with_span(err.span(input_len))
            .with_label(opener)
            .with_suggestion(err.help())
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", prefix, self.message)?;
        if let Some(ref span) = self.span {
            write!(f, "\n  --> bytes {}", span)?;
        }
        Ok(())
    }
}

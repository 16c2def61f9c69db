//! Remove comments from text while leaving quoted text untouched.
//!
//! Three comment styles are recognized:
//!
//! - `/* ... */` block comments, which may span lines,
//! - `// ...` line comments,
//! - `# ...` line comments.
//!
//! Line comments end at `\n`, `\r\n` or `\r`, and the terminator is part of
//! the comment. Anything inside `"..."` is copied verbatim, so
//! `"# not a comment"` survives. Within quotes only `\"` and `\\` are
//! escapes.
//!
//! Entry points:
//!
//! - [`clean`] strips everything and never fails.
//! - [`clean_fallible`] takes a [`StripperConfig`] and reports [`LexError`]s.
//! - [`clean_with_line_styles`] strips everything but can treat `#` or `//`
//!   as plain text.
//! - [`lexer::Lexer`] exposes the token stream itself.

pub mod lexer;
pub mod stripper;

pub use nocomment_common::{LexError, StripperConfig};
pub use stripper::{clean, clean_fallible, clean_with_line_styles, Stripper};

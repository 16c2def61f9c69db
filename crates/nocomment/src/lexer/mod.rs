pub mod cursor;
pub mod token;

mod scanner;

pub use scanner::{Lexer, LexerOptions};
pub use token::{Token, TokenKind};

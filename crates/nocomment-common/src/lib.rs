pub mod config;
pub mod errors;
pub mod span;

pub use config::{ConfigError, StripperConfig};
pub use errors::{Diagnostic, LexError, Severity};
pub use span::{Position, Span};

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::Diagnostic;

/// File name searched for by [`find_config`].
pub const CONFIG_FILE_NAME: &str = "nocomment.toml";

/// Which comment styles survive stripping, and which line-comment openers
/// the lexer recognizes at all.
///
/// All flags default to `false`: every comment style is recognized and
/// removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StripperConfig {
    /// Keep `/* ... */` comments in the output.
    pub keep_c_comments: bool,
    /// Keep `// ...` comments in the output.
    pub keep_cpp_comments: bool,
    /// Keep `# ...` comments in the output.
    pub keep_shell_comments: bool,
    /// Treat `#` as plain text instead of a comment opener.
    pub ignore_hash: bool,
    /// Treat `//` as plain text instead of a comment opener.
    pub ignore_slash: bool,
}

impl StripperConfig {
    /// Strip everything, but leave the given line-comment openers alone.
    pub fn with_line_styles(ignore_hash: bool, ignore_slash: bool) -> Self {
        Self {
            ignore_hash,
            ignore_slash,
            ..Self::default()
        }
    }

    /// Warnings for settings that cancel each other out: a comment style
    /// cannot be kept once its opener is scanned as text.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if self.keep_shell_comments && self.ignore_hash {
            diagnostics.push(
                Diagnostic::warning("keep_shell_comments has no effect while ignore_hash is set")
                    .with_suggestion("`#` lines already pass through as text"),
            );
        }
        if self.keep_cpp_comments && self.ignore_slash {
            diagnostics.push(
                Diagnostic::warning("keep_cpp_comments has no effect while ignore_slash is set")
                    .with_suggestion("`//` lines already pass through as text"),
            );
        }
        diagnostics
    }
}

/// Errors that can occur when loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no nocomment.toml found (searched from {0})")]
    NotFound(String),
    #[error("failed to read {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid nocomment.toml: {0}")]
    ParseError(String),
}

/// Walk up from `start_dir` looking for `nocomment.toml`.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load a config file from a path.
pub fn load_config(path: &Path) -> Result<StripperConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

/// Parse config file contents.
pub fn parse_config(content: &str) -> Result<StripperConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Find and load the config starting from an input file's directory.
pub fn find_and_load_config(input_file: &Path) -> Result<StripperConfig, ConfigError> {
    let start_dir = match input_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let config_path = find_config(start_dir)
        .ok_or_else(|| ConfigError::NotFound(start_dir.display().to_string()))?;
    load_config(&config_path)
}

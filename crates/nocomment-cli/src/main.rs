use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{ArgAction, Parser};
use log::LevelFilter;

use nocomment::lexer::{Lexer, LexerOptions, Token, TokenKind};
use nocomment::Stripper;
use nocomment_common::config::{self, ConfigError};
use nocomment_common::{Diagnostic, LexError, Position, StripperConfig};

/// Comment stripper.
///
/// Removes /* */, // and # comments from a file, leaving quoted text alone.
#[derive(Parser)]
#[command(
    name = "nocomment",
    version,
    about,
    long_about = "Comment stripper.\n\nRemoves C (/* */), C++ (//) and shell (#) comments from a file while\nleaving anything inside double quotes untouched.\n\nSettings are read from the nearest nocomment.toml above the input file,\nthen overridden by flags.\n\nExamples:\n  nocomment -i main.c -o main.nc.c                 Strip every comment\n  nocomment -i main.c -o out.c --ignore-hash       Leave #include lines alone\n  nocomment -i run.sh -o out.sh --keep-c           Keep block comments\n  nocomment -i main.c --emit-tokens                Print the token stream"
)]
struct Cli {
    /// Input file.
    #[arg(short, long)]
    input: PathBuf,

    /// Output file.
    #[arg(short, long, required_unless_present = "emit_tokens")]
    output: Option<PathBuf>,

    /// Config file (default: nearest nocomment.toml above the input).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep /* */ comments.
    #[arg(long = "keep-c")]
    keep_c: bool,

    /// Keep // comments.
    #[arg(long = "keep-cpp")]
    keep_cpp: bool,

    /// Keep # comments.
    #[arg(long = "keep-shell")]
    keep_shell: bool,

    /// Treat # as text rather than a comment.
    #[arg(long = "ignore-hash")]
    ignore_hash: bool,

    /// Treat // as text rather than a comment.
    #[arg(long = "ignore-slash")]
    ignore_slash: bool,

    /// Print the token stream as JSON lines instead of writing output.
    #[arg(long = "emit-tokens")]
    emit_tokens: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let input = match fs::read(&cli.input) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: could not read '{}': {}", cli.input.display(), e);
            process::exit(1);
        }
    };

    let file_name = cli
        .input
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let config = match resolve_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };
    log::debug!("using {:?}", config);
    for diag in config.diagnostics() {
        print_diagnostic(&diag, &input, &file_name);
    }

    let output_path = match cli.output {
        Some(ref path) if !cli.emit_tokens => path,
        _ => {
            emit_tokens(&input, config, &file_name);
            return;
        }
    };

    let output = match Stripper::new(config).clean(&input) {
        Ok(o) => o,
        Err(e) => {
            print_lex_error(&e, &input, &file_name);
            process::exit(1);
        }
    };

    match fs::write(output_path, &output) {
        Ok(()) => {
            log::info!(
                "cleaned {} -> {} ({} -> {} bytes)",
                cli.input.display(),
                output_path.display(),
                input.len(),
                output.len()
            );
        }
        Err(e) => {
            eprintln!("error: could not write '{}': {}", output_path.display(), e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Defaults, then the config file, then flags. Flags can only switch
/// options on.
fn resolve_config(cli: &Cli) -> Result<StripperConfig, ConfigError> {
    let mut config = match cli.config {
        Some(ref path) => config::load_config(path)?,
        None => {
            let abs_input = fs::canonicalize(&cli.input).unwrap_or_else(|_| cli.input.clone());
            match config::find_and_load_config(&abs_input) {
                Ok(c) => c,
                Err(ConfigError::NotFound(dir)) => {
                    log::debug!("no {} above {}", config::CONFIG_FILE_NAME, dir);
                    StripperConfig::default()
                }
                Err(e) => return Err(e),
            }
        }
    };
    config.keep_c_comments |= cli.keep_c;
    config.keep_cpp_comments |= cli.keep_cpp;
    config.keep_shell_comments |= cli.keep_shell;
    config.ignore_hash |= cli.ignore_hash;
    config.ignore_slash |= cli.ignore_slash;
    Ok(config)
}

fn emit_tokens(input: &[u8], config: StripperConfig, file_name: &str) {
    let stdout = io::stdout();
    match write_tokens(&mut stdout.lock(), input, config) {
        Ok(None) => {}
        Ok(Some(err)) => {
            print_lex_error(&err, input, file_name);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("error: could not write tokens: {}", e);
            process::exit(1);
        }
    }
}

/// Write one JSON object per token. Stops after an error token and
/// returns its error.
fn write_tokens(
    out: &mut impl Write,
    input: &[u8],
    config: StripperConfig,
) -> io::Result<Option<LexError>> {
    for token in Lexer::with_options(input, LexerOptions::from(config)) {
        writeln!(out, "{}", token_record(input, &token))?;
        if let TokenKind::Error(err) = token.kind {
            return Ok(Some(err));
        }
    }
    Ok(None)
}

fn token_record(input: &[u8], token: &Token<'_>) -> serde_json::Value {
    let pos = Position::locate(input, token.offset);
    let mut record = serde_json::json!({
        "offset": token.offset,
        "end": token.span().end,
        "line": pos.line,
        "column": pos.column,
        "kind": token.kind.name(),
        "text": token.text_lossy(),
    });
    if let TokenKind::Error(err) = token.kind {
        record["error"] = serde_json::Value::String(err.message().to_string());
    }
    record
}

fn print_lex_error(err: &LexError, input: &[u8], file_name: &str) {
    let diag = Diagnostic::from_lex_error(err, input.len());
    let pos = Position::locate(input, err.offset());
    log::debug!("{} at {}:{}", err, file_name, pos);
    print_diagnostic(&diag, input, file_name);
}

fn print_diagnostic(diag: &Diagnostic, input: &[u8], file_name: &str) {
    let Some(span) = diag.span else {
        eprintln!("{}", diag);
        if let Some(ref suggestion) = diag.suggestion {
            eprintln!("  = help: {}", suggestion);
        }
        return;
    };

    let (kind, color) = if diag.is_error() {
        (ReportKind::Error, Color::Red)
    } else {
        (ReportKind::Warning, Color::Yellow)
    };

    // ariadne indexes by char, the lexer by byte.
    let start = char_index(input, span.start);
    let end = char_index(input, span.end).max(start + 1);

    let mut label = Label::new((file_name, start..end)).with_color(color);
    if let Some(ref text) = diag.label {
        label = label.with_message(text);
    }

    let mut report = Report::build(kind, file_name, start)
        .with_message(&diag.message)
        .with_label(label);
    if let Some(ref suggestion) = diag.suggestion {
        report = report.with_help(suggestion);
    }

    let source = String::from_utf8_lossy(input);
    if report
        .finish()
        .eprint((file_name, Source::from(source.as_ref())))
        .is_err()
    {
        eprintln!("{}", diag);
    }
}

fn char_index(input: &[u8], offset: usize) -> usize {
    let end = offset.min(input.len());
    String::from_utf8_lossy(&input[..end]).chars().count()
}

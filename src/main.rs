//! Purpose: `jsonbatch` CLI entry point.
//! Role: Binary crate root; parses args, initialises logging, runs commands, emits JSON on stdout.
//! Invariants: Stdout carries only the requested report; timing logs and notices go to stderr.
//! Invariants: A closed stdout (broken pipe) ends output quietly; other write failures are `Io` errors.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap::error::ErrorKind as ClapErrorKind;
use clap_complete::aot::Shell;
use jsonbatch::api::{DEFAULT_MAX_FILE_BYTES, Error, ErrorKind, to_exit_code};
use jsonbatch::notice::{Notice, notice_json};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod report_json;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome { exit_code });
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint(clap_error_hint(&err)),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    init_tracing(cli.quiet);

    command_dispatch::dispatch_command(cli.command, color_mode)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "jsonbatch",
    version,
    about = "Load a directory of JSON files, timing each file and isolating failures",
    long_about = None,
    after_help = r#"EXAMPLES
  $ jsonbatch load ./data                        # summary JSON on stdout
  $ jsonbatch load ./data --output collection    # all documents as one array
  $ JSONBATCH_DIR=./data jsonbatch load --errors stop

LOGGING
  Batch and per-file start/end marks are logged to stderr at info level.
  Pass --quiet (or set RUST_LOG=warn) to keep only failed files."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[arg(
        short,
        long,
        global = true,
        help = "Log only warnings and errors (RUST_LOG still wins when set)"
    )]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ErrorPolicyCli {
    Stop,
    Skip,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SortCli {
    Listing,
    Name,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputCli {
    Summary,
    Documents,
    Collection,
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Load every JSON file of a directory",
        long_about = r#"Read each regular file of DIR with the selected extension, parse it as one JSON
value, and collect the values in listing order. Bad files are skipped and reported
unless --errors stop is given."#,
        after_help = r#"EXAMPLES
  $ jsonbatch load ./data
  $ jsonbatch load ./data --sort name --output documents
  $ jsonbatch load ./exports --all-files --errors stop

NOTES
  - Subdirectories are never loaded; symlinks to files are followed
  - A leading UTF-8 byte-order mark is ignored
  - Skipped files are reported as notices on stderr; exit code stays 0"#
    )]
    Load(LoadArgs),
    #[command(
        about = "Generate shell completion scripts",
        after_help = r#"EXAMPLES
  $ jsonbatch completion bash > ~/.local/share/bash-completion/completions/jsonbatch
  $ jsonbatch completion zsh > ~/.zfunc/_jsonbatch"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
    #[command(about = "Print version info as JSON")]
    Version,
}

#[derive(Args)]
struct LoadArgs {
    #[arg(
        env = "JSONBATCH_DIR",
        help = "Directory containing the JSON files",
        value_hint = ValueHint::DirPath
    )]
    dir: PathBuf,
    #[arg(
        short = 'e',
        long,
        value_enum,
        default_value = "skip",
        help = "On a bad file: skip it and continue, or stop the batch"
    )]
    errors: ErrorPolicyCli,
    #[arg(
        long,
        value_enum,
        default_value = "listing",
        help = "Processing order: filesystem listing or file name"
    )]
    sort: SortCli,
    #[arg(
        long,
        default_value = "json",
        conflicts_with = "all_files",
        help = "Only load files with this extension"
    )]
    ext: String,
    #[arg(long, help = "Load every regular file regardless of extension")]
    all_files: bool,
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_FILE_BYTES,
        help = "Skip files larger than this many bytes"
    )]
    max_file_bytes: u64,
    #[arg(
        short = 'o',
        long,
        value_enum,
        default_value = "summary",
        help = "Stdout report: summary|documents (JSONL)|collection (one array)"
    )]
    output: OutputCli,
    #[arg(long, help = "Pretty-print the summary or collection")]
    pretty: bool,
}

fn init_tracing(quiet: bool) {
    let fallback = if quiet { "warn" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn emit_json(value: &Value, pretty: bool) -> Result<(), Error> {
    emit_json_lines([value], pretty)
}

fn emit_json_lines<'a>(
    values: impl IntoIterator<Item = &'a Value>,
    pretty: bool,
) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_json_lines(&mut out, values, pretty)
}

fn emit_bytes(bytes: &[u8]) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    stdout_result(out.write_all(bytes).and_then(|()| out.flush()))
}

fn write_json_lines<'a, W: Write>(
    out: &mut W,
    values: impl IntoIterator<Item = &'a Value>,
    pretty: bool,
) -> Result<(), Error> {
    let written = values
        .into_iter()
        .try_for_each(|value| {
            if pretty {
                serde_json::to_writer_pretty(&mut *out, value)?;
            } else {
                serde_json::to_writer(&mut *out, value)?;
            }
            writeln!(out)
        })
        .and_then(|()| out.flush());
    stdout_result(written)
}

fn stdout_result(result: io::Result<()>) -> Result<(), Error> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(Error::new(ErrorKind::Io)
            .with_message("failed to write stdout")
            .with_source(err)),
    }
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn notice_time_now() -> String {
    use time::format_description::well_known::Rfc3339;
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| {
            time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()
        })
        .and_then(|ts| ts.format(&Rfc3339).ok())
        .unwrap_or_else(|| "unknown".to_string())
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        let label = colorize_label("notice:", color_mode.use_color(is_tty), AnsiColor::Yellow);
        eprintln!("{label} {}", notice.message);
        return;
    }

    let value = notice_json(notice);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Permission => "permission denied".to_string(),
        ErrorKind::Corrupt => "invalid data".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = std::error::Error::source(err);
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    if let Some(column) = err.column() {
        inner.insert("column".to_string(), json!(column));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let (Some(line), Some(column)) = (err.line(), err.column()) {
        lines.push(format!(
            "{} line {line}, column {column}",
            colorize_label("at:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::Permission => {
            err.with_hint("Permission denied. Check read permissions on the directory and files.")
        }
        ErrorKind::Io => err.with_hint("I/O error. Check the path and filesystem."),
        ErrorKind::Corrupt => {
            err.with_hint("Fix the file or rerun with --errors skip to load the rest.")
        }
        _ => err,
    }
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_BACKTRACE=1 and share command/context if it persists.",
    )
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let missing_required = rendered.contains("required arguments were not provided")
        || rendered.contains("required argument was not provided");
    if missing_required && rendered.contains("<DIR>") {
        return "Provide a directory, for example: `jsonbatch load ./data` (or set JSONBATCH_DIR)."
            .to_string();
    }
    let subcommand = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .and_then(|usage| {
            usage
                .split_whitespace()
                .skip_while(|token| *token != "jsonbatch")
                .nth(1)
        })
        .filter(|token| !token.starts_with('-') && !token.starts_with('<') && !token.starts_with('['));
    match subcommand {
        Some(name) => format!("Try `jsonbatch {name} --help`."),
        None => "Try `jsonbatch --help`.".to_string(),
    }
}

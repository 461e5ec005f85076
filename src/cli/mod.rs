//! Command-line interface for convo-edit.
//!
//! Scriptable access to the same store the TUI drives:
//! - `check`: Import a file and report per-line failures
//! - `list` / `search` / `show`: Browse the parsed conversations
//! - `edit`: Replace one message and write the result
//! - `export`: Normalised re-export, optionally filtered
//! - `tui`: Interactive editor

mod commands;

pub use commands::*;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

use crate::error::Result;

/// Inspect, search and edit conversation logs stored as JSONL.
#[derive(Debug, Parser)]
#[command(name = "convo-edit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format for structured data.
    #[arg(short = 'o', long, global = true, default_value = "text", env = "CONVO_EDIT_OUTPUT")]
    pub output: OutputFormat,

    /// Enable verbose output.
    #[arg(short = 'v', long, global = true, env = "CONVO_EDIT_VERBOSE")]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short = 'q', long, global = true, env = "CONVO_EDIT_QUIET")]
    pub quiet: bool,

    /// Output as JSON (shorthand for -o json).
    #[arg(long, global = true, env = "CONVO_EDIT_JSON")]
    pub json: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn", env = "CONVO_EDIT_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log format (text, json, compact, pretty).
    #[arg(long, global = true, default_value = "text", env = "CONVO_EDIT_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Path to custom configuration file.
    #[arg(long, global = true, env = "CONVO_EDIT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Log level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Errors, warnings, and informational messages.
    Info,
    /// All of the above plus debug messages.
    Debug,
    /// All messages including trace-level details.
    Trace,
}

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// Structured JSON format for machine consumption.
    Json,
    /// Compact single-line format.
    Compact,
    /// Pretty format with full details.
    Pretty,
}

impl LogLevel {
    /// Convert to tracing filter level.
    #[must_use]
    pub const fn to_filter_string(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl Cli {
    /// Get effective output format.
    #[must_use]
    pub const fn effective_output(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.output
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import a file and report conversations and failed lines.
    #[command(alias = "validate")]
    Check(CheckArgs),

    /// List conversations with message counts and previews.
    #[command(alias = "ls")]
    List(ListArgs),

    /// Print the messages of one conversation.
    #[command(alias = "cat")]
    Show(ShowArgs),

    /// Find conversations containing text.
    #[command(alias = "s", alias = "find")]
    Search(SearchArgs),

    /// Replace the content of one message.
    #[command(alias = "e")]
    Edit(EditArgs),

    /// Re-export conversations as normalised JSONL.
    #[command(alias = "x")]
    Export(ExportArgs),

    /// Launch the interactive editor.
    #[command(alias = "ui")]
    Tui(TuiArgs),

    /// View and modify configuration.
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Arguments for the completions command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// PowerShell.
    Powershell,
    /// Elvish shell.
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Self::Bash,
            CompletionShell::Zsh => Self::Zsh,
            CompletionShell::Fish => Self::Fish,
            CompletionShell::Powershell => Self::PowerShell,
            CompletionShell::Elvish => Self::Elvish,
        }
    }
}

/// Generate shell completions and print to stdout.
pub fn generate_completions(shell: CompletionShell) {
    let mut cmd = Cli::command();
    let shell: Shell = shell.into();
    generate(shell, &mut cmd, "convo-edit", &mut io::stdout());
}

/// Output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// Tab-separated values.
    Tsv,
    /// Compact single-line output.
    Compact,
}

/// Arguments for the check command.
#[derive(Debug, Parser)]
pub struct CheckArgs {
    /// JSONL file to check.
    pub file: PathBuf,

    /// Stop at the first bad line.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the list command.
#[derive(Debug, Parser)]
pub struct ListArgs {
    /// JSONL file to read.
    pub file: PathBuf,

    /// Only list conversations matching this text (case-insensitive).
    #[arg(short = 'Q', long)]
    pub query: Option<String>,

    /// Limit number of results.
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Preview width in characters (default from config).
    #[arg(short = 'w', long)]
    pub width: Option<usize>,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// JSONL file to read.
    pub file: PathBuf,

    /// 1-based conversation position.
    pub position: usize,
}

/// Arguments for the search command.
#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// JSONL file to read.
    pub file: PathBuf,

    /// Text to look for (case-insensitive).
    pub query: String,

    /// Only print the number of matches.
    #[arg(short = 'c', long)]
    pub count: bool,

    /// Limit number of results.
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for the edit command.
#[derive(Debug, Parser)]
pub struct EditArgs {
    /// JSONL file to edit.
    pub file: PathBuf,

    /// 1-based conversation position.
    #[arg(short = 'c', long)]
    pub conversation: usize,

    /// 0-based message index within the conversation.
    #[arg(short = 'm', long)]
    pub message: usize,

    /// New message content.
    #[arg(long, conflicts_with = "content_file", required_unless_present = "content_file")]
    pub content: Option<String>,

    /// Read the new message content from a file.
    #[arg(long)]
    pub content_file: Option<PathBuf>,

    /// Write the result to this file instead of stdout.
    #[arg(long, conflicts_with = "in_place")]
    pub out: Option<PathBuf>,

    /// Overwrite the input file. Refused when some lines failed to parse.
    #[arg(short = 'i', long)]
    pub in_place: bool,

    /// Allow --in-place to overwrite a file whose unparsable lines will be lost.
    #[arg(long, requires = "in_place")]
    pub drop_invalid: bool,
}

/// Arguments for the export command.
#[derive(Debug, Parser)]
pub struct ExportArgs {
    /// JSONL file to read.
    pub file: PathBuf,

    /// Output file (default: stdout).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Only export conversations matching this text.
    #[arg(short = 'Q', long)]
    pub query: Option<String>,

    /// End the output with a newline.
    #[arg(long)]
    pub trailing_newline: bool,
}

/// Arguments for the TUI command.
#[derive(Debug, Parser)]
pub struct TuiArgs {
    /// JSONL file to open.
    pub file: PathBuf,

    /// File written by the export key (default: `<stem>.<suffix>.jsonl` next to the input).
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Theme name (dark, light, high-contrast).
    #[arg(long)]
    pub theme: Option<String>,

    /// Mirror the export to this file after every change.
    #[arg(long)]
    pub mirror: Option<PathBuf>,

    /// Use ASCII-only symbols.
    #[arg(long)]
    pub ascii: bool,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Config action to perform.
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommand actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show all configuration values.
    Show,

    /// Get a specific configuration value.
    Get {
        /// Configuration key (e.g., "editor.strict").
        key: String,
    },

    /// Set a configuration value.
    Set {
        /// Configuration key (e.g., "editor.strict").
        key: String,
        /// Value to set.
        value: String,
    },

    /// Show configuration file path.
    Path,

    /// Initialize configuration file with defaults.
    Init,

    /// Reset configuration to defaults.
    Reset,
}

/// Initialize tracing/logging based on CLI options.
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{
        fmt::{self, format::FmtSpan},
        layer::SubscriberExt,
        util::SubscriberInitExt,
        EnvFilter,
    };

    let level = if cli.verbose && cli.log_level == LogLevel::Warn {
        LogLevel::Info
    } else {
        cli.log_level
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_filter_string()));

    let result = match cli.log_format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
    };

    if let Err(e) = result {
        eprintln!("Warning: Could not initialize logging: {e}");
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli);

    match &cli.command {
        Commands::Check(args) => commands::check::run(&cli, args),
        Commands::List(args) => commands::list::run(&cli, args),
        Commands::Show(args) => commands::show::run(&cli, args),
        Commands::Search(args) => commands::search::run(&cli, args),
        Commands::Edit(args) => commands::edit::run(&cli, args),
        Commands::Export(args) => commands::export::run(&cli, args),
        Commands::Tui(args) => commands::tui::run(&cli, args),
        Commands::Config(args) => commands::config::run(&cli, args),
        Commands::Completions(args) => {
            generate_completions(args.shell);
            Ok(())
        }
    }
}

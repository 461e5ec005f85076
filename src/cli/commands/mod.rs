//! CLI command implementations.
//!
//! Each command is implemented in its own module with a `run` function
//! that handles the command logic.

pub mod check;
pub mod config;
pub mod edit;
pub mod export;
pub mod list;
pub mod search;
pub mod show;
pub mod tui;

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, Config};
use crate::error::Result;
use crate::export::ExportOptions;
use crate::session::{NoticeLevel, Session};

/// Path of the configuration file this invocation reads and writes.
pub fn config_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => default_config_path(),
    }
}

/// Load configuration from `--config`, or the global file merged with the
/// project file in the current directory.
pub fn load_config(cli: &Cli) -> Config {
    match &cli.config {
        Some(path) => Config::load_from(path).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config from {}: {e}", path.display());
            Config::default()
        }),
        None => std::env::current_dir()
            .ok()
            .and_then(|dir| Config::load_for_project(&dir).ok())
            .unwrap_or_default(),
    }
}

/// Create a session configured from `config` and import `file` into it.
///
/// Warnings raised by the import go to stderr unless `--quiet` is set or the
/// config hides parse errors.
pub fn open_session(cli: &Cli, config: &Config, file: &Path) -> Result<Session> {
    let mut session = Session::new().with_import_options(config.import_options());
    session.import_file(file)?;
    report_notices(cli, config, &mut session);
    Ok(session)
}

/// Drain session notices to stderr.
pub fn report_notices(cli: &Cli, config: &Config, session: &mut Session) {
    for notice in session.take_notices() {
        let shown = match notice.level {
            NoticeLevel::Info => cli.verbose,
            NoticeLevel::Warning => !cli.quiet && config.display.show_errors,
            NoticeLevel::Error => true,
        };
        if shown {
            eprintln!("{notice}");
        }
    }
}

/// Write exported JSONL to `out`, or to stdout when no path is given.
pub fn write_output(text: &str, out: Option<&Path>, options: ExportOptions) -> Result<()> {
    match out {
        Some(path) => crate::export::write_jsonl(path, text, options),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            // Terminal output always ends the last line.
            writeln!(stdout)?;
            stdout.flush()?;
            Ok(())
        }
    }
}

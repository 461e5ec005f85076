//! Edit command implementation.
//!
//! Replaces the content of a single message and writes the whole collection
//! back out as JSONL.

use std::path::Path;

use crate::cli::{Cli, EditArgs};
use crate::error::{EditorError, Result};
use crate::export::ExportOptions;

use super::{load_config, open_session, report_notices, write_output};

/// Run the edit command.
pub fn run(cli: &Cli, args: &EditArgs) -> Result<()> {
    let config = load_config(cli);
    let content = read_content(args)?;
    let mut session = open_session(cli, &config, &args.file)?;

    if args.in_place && !args.drop_invalid {
        if let Some(first) = session.store().errors().first() {
            let count = session.store().errors().len();
            return Err(EditorError::parse(
                first.line,
                format!(
                    "{count} unparsable line{} would be lost; refusing to overwrite {} \
                     (use --out, or --drop-invalid to discard them)",
                    if count == 1 { "" } else { "s" },
                    args.file.display()
                ),
            ));
        }
    }

    let id = session
        .store()
        .id_at(args.conversation)
        .ok_or_else(|| EditorError::invalid_target(args.conversation, Some(args.message)))?;
    let previous = session.edit_message(id, args.message, content)?;
    tracing::debug!(previous_len = previous.len(), "Replaced message content");

    let text = session.export()?;
    let out = if args.in_place {
        Some(args.file.as_path())
    } else {
        args.out.as_deref()
    };
    write_output(&text, out, ExportOptions::default())?;
    report_notices(cli, &config, &mut session);

    if let Some(path) = out {
        if !cli.quiet {
            eprintln!(
                "Edited conversation {}, message {}; wrote {}",
                args.conversation,
                args.message,
                path.display()
            );
        }
    }

    Ok(())
}

fn read_content(args: &EditArgs) -> Result<String> {
    match (&args.content, &args.content_file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => read_file(path),
        (None, None) => Err(EditorError::ConfigError {
            message: "either --content or --content-file is required".to_string(),
        }),
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        EditorError::from_io_at(path, format!("Failed to read {}", path.display()), e)
    })
}

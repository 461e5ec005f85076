//! List command implementation.
//!
//! Lists the conversations of a file, optionally narrowed by a query.

use std::io::Write;

use crate::cli::{Cli, ListArgs, OutputFormat};
use crate::error::Result;
use crate::filter::FilteredEntry;

use super::{load_config, open_session};

/// Run the list command.
pub fn run(cli: &Cli, args: &ListArgs) -> Result<()> {
    let config = load_config(cli);
    let mut session = open_session(cli, &config, &args.file)?;
    if let Some(query) = &args.query {
        session.store_mut().set_query(query.as_str());
    }

    let store = session.store();
    let mut entries = store.filtered();
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }
    let width = args.width.unwrap_or(config.display.preview_width);

    let mut writer = std::io::stdout().lock();
    match cli.effective_output() {
        OutputFormat::Json => {
            let output: Vec<_> = entries.iter().map(|e| ListEntry::new(e, width)).collect();
            writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        }
        OutputFormat::Tsv => {
            writeln!(writer, "position\tmessages\tpreview")?;
            for entry in &entries {
                writeln!(
                    writer,
                    "{}\t{}\t{}",
                    entry.position,
                    entry.conversation.len(),
                    entry.conversation.preview(width)
                )?;
            }
        }
        OutputFormat::Compact => {
            for entry in &entries {
                writeln!(writer, "{}", entry.position)?;
            }
        }
        OutputFormat::Text => {
            if entries.is_empty() {
                writeln!(writer, "No conversations found.")?;
                return Ok(());
            }

            writeln!(
                writer,
                "Conversations ({} of {}):",
                entries.len(),
                store.len()
            )?;
            writeln!(writer)?;
            for entry in &entries {
                let count = entry.conversation.len();
                writeln!(
                    writer,
                    "  {} ({} message{})  {}",
                    entry.label(),
                    count,
                    if count == 1 { "" } else { "s" },
                    entry.conversation.preview(width)
                )?;
            }
        }
    }

    Ok(())
}

/// Serializable list row.
#[derive(Debug, serde::Serialize)]
struct ListEntry {
    position: usize,
    label: String,
    messages: usize,
    preview: String,
}

impl ListEntry {
    fn new(entry: &FilteredEntry<'_>, width: usize) -> Self {
        Self {
            position: entry.position,
            label: entry.label(),
            messages: entry.conversation.len(),
            preview: entry.conversation.preview(width),
        }
    }
}

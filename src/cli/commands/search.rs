//! Search command implementation.
//!
//! Case-insensitive substring search over conversations and their labels.

use crate::cli::{Cli, OutputFormat, SearchArgs};
use crate::error::Result;

use super::{load_config, open_session};

/// Run the search command.
pub fn run(cli: &Cli, args: &SearchArgs) -> Result<()> {
    let config = load_config(cli);
    let mut session = open_session(cli, &config, &args.file)?;
    session.store_mut().set_query(args.query.as_str());

    let mut matches = session.store().filtered();
    let total = matches.len();
    if let Some(limit) = args.limit {
        matches.truncate(limit);
    }

    if args.count {
        match cli.effective_output() {
            OutputFormat::Json => println!("{}", serde_json::json!({ "count": total })),
            _ => println!("{total}"),
        }
        return Ok(());
    }

    match cli.effective_output() {
        OutputFormat::Json => {
            let results: Vec<_> = matches
                .iter()
                .map(|m| SearchResult {
                    position: m.position,
                    label: m.label(),
                    preview: m.conversation.preview(config.display.preview_width),
                })
                .collect();
            let output = SearchOutput {
                query: &args.query,
                total_matches: total,
                results,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("position\tlabel");
            for m in &matches {
                println!("{}\t{}", m.position, m.label());
            }
        }
        OutputFormat::Compact => {
            for m in &matches {
                println!("{}", m.position);
            }
        }
        OutputFormat::Text => {
            if matches.is_empty() {
                println!("No matches for \"{}\".", args.query);
                return Ok(());
            }
            for m in &matches {
                println!(
                    "{}: {}",
                    m.label(),
                    m.conversation.preview(config.display.preview_width)
                );
            }
            if !cli.quiet {
                println!();
                println!("{total} match{}", if total == 1 { "" } else { "es" });
            }
        }
    }

    Ok(())
}

#[derive(Debug, serde::Serialize)]
struct SearchResult {
    position: usize,
    label: String,
    preview: String,
}

#[derive(Debug, serde::Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    total_matches: usize,
    results: Vec<SearchResult>,
}

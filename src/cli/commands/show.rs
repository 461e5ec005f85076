//! Show command implementation.
//!
//! Prints every message of one conversation.

use crate::cli::{Cli, OutputFormat, ShowArgs};
use crate::error::{EditorError, Result};
use crate::model::label;

use super::{load_config, open_session};

/// Run the show command.
pub fn run(cli: &Cli, args: &ShowArgs) -> Result<()> {
    let config = load_config(cli);
    let session = open_session(cli, &config, &args.file)?;
    let conversation = session
        .store()
        .id_at(args.position)
        .and_then(|id| session.store().get(id))
        .ok_or_else(|| EditorError::invalid_target(args.position, None))?;

    match cli.effective_output() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(conversation)?);
        }
        OutputFormat::Compact => {
            println!("{}", conversation.to_json_line()?);
        }
        OutputFormat::Tsv => {
            println!("index\trole\tcontent");
            for (idx, message) in conversation.messages.iter().enumerate() {
                println!("{idx}\t{}\t{}", message.role, escape_tsv(&message.content));
            }
        }
        OutputFormat::Text => {
            println!("{}", label(args.position));
            println!("==================");
            if conversation.is_empty() {
                println!();
                println!("(no messages)");
            }
            for (idx, message) in conversation.messages.iter().enumerate() {
                println!();
                println!("[{idx}] {}", message.role);
                for line in message.content.lines() {
                    println!("    {line}");
                }
            }
        }
    }

    Ok(())
}

fn escape_tsv(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_tsv() {
        assert_eq!(escape_tsv("a\tb\nc\\"), "a\\tb\\nc\\\\");
    }
}

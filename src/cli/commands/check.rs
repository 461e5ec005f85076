//! Check command implementation.
//!
//! Imports a file and reports what parsed and which lines did not.

use crate::cli::{CheckArgs, Cli, OutputFormat};
use crate::error::{EditorError, Result};
use crate::parser::{JsonlParser, LineError, ParseStats};
use crate::util::truncate_chars;

use super::load_config;

/// Width of the line excerpt shown for a failed line.
const EXCERPT_WIDTH: usize = 60;

/// Run the check command.
pub fn run(cli: &Cli, args: &CheckArgs) -> Result<()> {
    let config = load_config(cli);
    let mut parser = JsonlParser::new()
        .with_lenient(!(args.strict || config.editor.strict))
        .with_max_bytes(config.editor.max_file_size);

    let outcome = parser.parse_file(&args.file)?;
    let report = CheckReport {
        file: args.file.display().to_string(),
        stats: parser.stats().clone(),
        errors: outcome.errors,
    };

    match cli.effective_output() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Tsv => {
            println!("line\tkind\tmessage");
            for error in &report.errors {
                println!("{}\t{}\t{}", error.line, error.kind, error.message);
            }
        }
        OutputFormat::Compact => {
            let status = if report.errors.is_empty() { "OK" } else { "FAIL" };
            println!(
                "{}:{} ({}C/{}E)",
                report.file,
                status,
                report.stats.conversations_parsed,
                report.errors.len()
            );
        }
        OutputFormat::Text => print_text(cli, &report),
    }

    match report.errors.first() {
        None => Ok(()),
        Some(first) => Err(EditorError::parse(
            first.line,
            format!(
                "{} of {} lines failed to parse",
                report.errors.len(),
                report.stats.lines_processed
            ),
        )),
    }
}

fn print_text(cli: &Cli, report: &CheckReport) {
    let stats = &report.stats;
    println!("Check: {}", report.file);
    println!("==================");
    println!();
    println!("Lines:          {}", stats.lines_processed);
    println!("Conversations:  {}", stats.conversations_parsed);
    println!("Messages:       {}", stats.messages_parsed);
    println!("Blank lines:    {}", stats.empty_lines);
    println!("Failed lines:   {}", stats.lines_failed);
    if cli.verbose {
        println!("Success rate:   {:.1}%", stats.success_rate());
    }

    if report.errors.is_empty() {
        println!();
        println!("All lines parsed successfully.");
        return;
    }

    println!();
    for error in &report.errors {
        println!("  line {} ({}): {}", error.line, error.kind, error.message);
        if !cli.quiet {
            println!("    {}", truncate_chars(error.content.trim(), EXCERPT_WIDTH));
        }
    }
}

/// Complete check report.
#[derive(Debug, serde::Serialize)]
struct CheckReport {
    file: String,
    stats: ParseStats,
    errors: Vec<LineError>,
}

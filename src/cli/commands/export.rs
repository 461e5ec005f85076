//! Export command implementation.
//!
//! Re-serializes a file as normalised JSONL, optionally keeping only the
//! conversations that match a query.

use crate::cli::{Cli, ExportArgs};
use crate::error::Result;
use crate::export::ExportOptions;

use super::{load_config, open_session, write_output};

/// Run the export command.
pub fn run(cli: &Cli, args: &ExportArgs) -> Result<()> {
    let config = load_config(cli);
    let mut session = open_session(cli, &config, &args.file)?;

    let text = match &args.query {
        Some(query) => {
            session.store_mut().set_query(query.as_str());
            session.store().export_filtered()?
        }
        None => session.export()?,
    };

    let options = ExportOptions {
        trailing_newline: args.trailing_newline,
    };
    write_output(&text, args.out.as_deref(), options)?;

    if let Some(path) = &args.out {
        if !cli.quiet {
            eprintln!("Exported {} lines to {}", text.lines().count(), path.display());
        }
    }

    Ok(())
}

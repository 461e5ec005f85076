//! TUI launcher command.
//!
//! Opens one JSONL file in the interactive editor.

use crate::cli::{Cli, TuiArgs};
use crate::error::Result;

/// Run the TUI command.
pub fn run(cli: &Cli, args: &TuiArgs) -> Result<()> {
    #[cfg(feature = "tui")]
    {
        use std::path::Path;

        use crate::session::{FileMirror, Session};
        use crate::tui::{Theme, TuiOptions};
        use crate::util::derived_output_path;

        let config = super::load_config(cli);

        let mut session = Session::new().with_import_options(config.import_options());
        let mirror = args
            .mirror
            .clone()
            .or_else(|| config.mirror_path().map(Path::to_path_buf));
        if let Some(path) = mirror {
            tracing::info!(path = %path.display(), "Mirroring exports");
            session = session.with_mirror(Box::new(FileMirror::new(path)));
        }
        session.import_file(&args.file)?;

        let theme_name = args.theme.as_deref().unwrap_or(&config.theme.name);
        let theme = if config.theme.color {
            Theme::from_name(theme_name).unwrap_or_else(|| {
                tracing::warn!(theme = theme_name, "Unknown theme, using dark");
                Theme::dark()
            })
        } else {
            Theme::monochrome()
        };

        let output = args
            .out
            .clone()
            .unwrap_or_else(|| derived_output_path(&args.file, &config.editor.output_suffix));

        crate::tui::run(
            session,
            TuiOptions {
                output,
                theme,
                ascii: args.ascii || !config.theme.unicode,
                show_errors: config.display.show_errors,
            },
        )
    }

    #[cfg(not(feature = "tui"))]
    {
        let _ = (cli, args);
        Err(crate::error::EditorError::unsupported(
            "TUI feature not enabled. Rebuild with --features tui",
        ))
    }
}

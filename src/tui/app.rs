//! TUI application main loop and drawing.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::error::{EditorError, Result};
use crate::model::label;
use crate::session::Session;

use super::components::{message_body, message_header, ScrollableText, StatusBar};
use super::events::{Event, EventHandler};
use super::state::{Action, AppState, Focus, Mode, TuiOptions};
use super::theme::available_themes;

/// Run the editor on an imported session until the user quits.
pub fn run(session: Session, options: TuiOptions) -> Result<()> {
    enable_raw_mode().map_err(|e| {
        EditorError::io(
            "Cannot launch TUI - no interactive terminal available. \
             The TUI requires a terminal with keyboard input support",
            e,
        )
    })?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| EditorError::io("Failed to enter alternate screen", e))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| EditorError::io("Failed to create terminal", e))?;

    let mut app = AppState::new(session, options);
    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().map_err(|e| EditorError::io("Failed to disable raw mode", e))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| EditorError::io("Failed to leave alternate screen", e))?;
    terminal
        .show_cursor()
        .map_err(|e| EditorError::io("Failed to show cursor", e))?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    let events = EventHandler::new(Duration::from_millis(100));

    loop {
        draw(terminal, app)?;

        match events.next() {
            Ok(Event::Key(key)) => {
                if app.handle_key(key) == Action::Quit {
                    let ctrl_c = key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL);
                    if ctrl_c {
                        return Err(EditorError::Interrupted);
                    }
                    return Ok(());
                }
            }
            Ok(Event::Tick | Event::Resize(..)) => {}
            Err(_) => {
                return Err(EditorError::TuiError {
                    message: "input thread stopped".to_string(),
                })
            }
        }
    }
}

/// Draw one frame on any backend.
pub fn draw<B: Backend>(terminal: &mut Terminal<B>, app: &AppState) -> Result<()> {
    terminal
        .draw(|f| draw_ui(f, app))
        .map_err(|e| EditorError::TuiError {
            message: format!("Failed to draw TUI: {e}"),
        })?;
    Ok(())
}

/// Draw the UI.
fn draw_ui(f: &mut Frame, app: &AppState) {
    let search_height = if app.mode == Mode::Search { 3 } else { 0 };
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(search_height),
            Constraint::Length(1),
        ])
        .split(f.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(main_chunks[0]);

    draw_list_panel(f, app, columns[0]);

    if app.show_errors {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[1]);
        draw_detail_panel(f, app, rows[0]);
        draw_errors_panel(f, app, rows[1]);
    } else {
        draw_detail_panel(f, app, columns[1]);
    }

    if app.mode == Mode::Search {
        draw_search_bar(f, app, main_chunks[1]);
    }

    draw_status_bar(f, app, main_chunks[2]);

    if app.mode == Mode::Edit {
        draw_editor(f, app);
    }

    if app.show_help {
        draw_help_overlay(f, app);
    }
}

/// Draw the conversation list (the filtered view).
fn draw_list_panel(f: &mut Frame, app: &AppState, area: Rect) {
    let store = app.session.store();
    let view = store.filtered();
    let selected = store.selected_id();

    let visible_height = usize::from(area.height.saturating_sub(2));
    let cursor = view.iter().position(|e| Some(e.id) == selected).unwrap_or(0);
    let offset = (cursor + 1).saturating_sub(visible_height);

    let items: Vec<ListItem> = view
        .iter()
        .skip(offset)
        .take(visible_height)
        .map(|entry| {
            let is_selected = Some(entry.id) == selected;
            let marker = if is_selected { app.symbols.selected } else { "  " };
            let text = format!("{marker}{} ({})", entry.label(), entry.conversation.len());
            let style = if is_selected {
                app.theme.selection_style()
            } else {
                Style::default()
            };
            ListItem::new(text).style(style)
        })
        .collect();

    let title = if store.query().is_empty() {
        format!(" Conversations ({}) ", store.len())
    } else {
        format!(" Conversations ({}/{}) ", view.len(), store.len())
    };

    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(app.theme.border_style(app.focus == Focus::List)),
    );

    f.render_widget(list, area);
}

/// Draw the messages of the selected conversation.
fn draw_detail_panel(f: &mut Frame, app: &AppState, area: Rect) {
    let store = app.session.store();
    let editing = store.edit_state().map(|e| (e.conversation, e.message));

    let (title, lines, cursor_line) = match store.selected() {
        None => (
            " Messages ".to_string(),
            vec![Line::from(if store.is_empty() {
                "No conversations loaded"
            } else {
                "Nothing selected"
            })],
            0,
        ),
        Some(stored) => {
            let position = store.position_of(stored.id).unwrap_or_default();
            let mut lines = Vec::new();
            let mut cursor_line = 0;
            for (idx, message) in stored.conversation.messages.iter().enumerate() {
                if idx == app.message_cursor {
                    cursor_line = lines.len();
                }
                let is_editing = editing == Some((stored.id, idx));
                lines.push(message_header(
                    idx,
                    message,
                    &app.theme,
                    app.symbols,
                    idx == app.message_cursor,
                    is_editing,
                ));
                lines.extend(message_body(&message.content));
                lines.push(Line::from(""));
            }
            if lines.is_empty() {
                lines.push(Line::from("(no messages)"));
            }
            (format!(" {} ", label(position)), lines, cursor_line)
        }
    };

    // Keep the cursor's header in view.
    let visible_height = usize::from(area.height.saturating_sub(2));
    let scroll = cursor_line.saturating_sub(visible_height / 3);

    ScrollableText::new(title, &app.theme)
        .content(lines)
        .scroll(scroll)
        .focused(app.focus == Focus::Detail)
        .render(f, area);
}

/// Draw the parse error panel.
fn draw_errors_panel(f: &mut Frame, app: &AppState, area: Rect) {
    let errors = app.session.store().errors();
    let lines: Vec<Line> = if errors.is_empty() {
        vec![Line::styled("No parse errors", app.theme.success_style())]
    } else {
        errors
            .iter()
            .map(|e| {
                Line::from(vec![
                    Span::styled(format!("line {} ", e.line), app.theme.error_style()),
                    Span::styled(format!("({}) ", e.kind), app.theme.warning_style()),
                    Span::raw(e.message.clone()),
                ])
            })
            .collect()
    };

    ScrollableText::new(format!(" Parse errors ({}) ", errors.len()), &app.theme)
        .content(lines)
        .scroll(app.errors_scroll)
        .focused(app.focus == Focus::Errors)
        .render(f, area);
}

/// Draw the search bar.
fn draw_search_bar(f: &mut Frame, app: &AppState, area: Rect) {
    let store = app.session.store();
    let text = format!(
        "/{}{} [{} match{}]",
        store.query(),
        app.symbols.caret,
        store.filtered().len(),
        if store.filtered().len() == 1 { "" } else { "es" }
    );

    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(app.theme.primary).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.warning_style())
                .title(" Search (Enter to confirm, Esc to clear) "),
        );

    f.render_widget(paragraph, area);
}

/// Draw the message editor overlay.
fn draw_editor(f: &mut Frame, app: &AppState) {
    let store = app.session.store();
    let Some(edit) = store.edit_state() else {
        return;
    };
    let area = centered_rect(70, 60, f.area());

    let (before, after) = split_at_char(&edit.draft, app.caret);
    let caret = Span::styled(
        app.symbols.caret.to_string(),
        Style::default().fg(app.theme.primary),
    );

    // Rebuild lines so the caret sits inside the right one.
    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<Span> = Vec::new();
    push_text(before, &mut current, &mut lines);
    current.push(caret);
    push_text(after, &mut current, &mut lines);
    lines.push(Line::from(current));

    let position = store.position_of(edit.conversation).unwrap_or_default();
    let dirty = if edit.is_dirty() { " [modified]" } else { "" };
    let title = format!(
        " Edit {}, message {}{dirty} (Enter save, Esc cancel, Ctrl+J newline) ",
        label(position),
        edit.message
    );

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(app.theme.border_style(true)),
    );

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

/// Draw the status bar.
fn draw_status_bar(f: &mut Frame, app: &AppState, area: Rect) {
    let sep = app.symbols.separator;
    let mode = match app.mode {
        Mode::Normal if app.show_help => "HELP",
        Mode::Normal => match app.focus {
            Focus::List => "LIST",
            Focus::Detail => "MESSAGES",
            Focus::Errors => "ERRORS",
        },
        Mode::Search => "SEARCH",
        Mode::Edit => "EDIT",
    };

    let brand = Span::styled(
        " convo-edit ",
        Style::default().fg(app.theme.primary).add_modifier(Modifier::BOLD),
    );

    let left = match &app.status {
        Some(notice) => vec![
            brand,
            Span::raw(format!("{sep} ")),
            Span::styled(notice.message.clone(), app.theme.notice_style(notice.level)),
        ],
        None => vec![
            brand,
            Span::raw(format!("{sep} ")),
            Span::styled(mode, app.theme.warning_style()),
            Span::raw(format!(" {sep} ")),
            Span::styled(app.theme.name.clone(), Style::default().fg(app.theme.secondary)),
        ],
    };

    let store = app.session.store();
    let mut right = Vec::new();
    if store.is_modified() {
        right.push(Span::styled("[+] ", app.theme.warning_style()));
    }
    if !store.errors().is_empty() {
        right.push(Span::styled(
            format!("{} errors ", store.errors().len()),
            app.theme.error_style(),
        ));
    }
    right.push(Span::raw(format!(
        "{sep} {}/{} {sep} ? for help ",
        store.selected_position().unwrap_or(0),
        store.len()
    )));

    StatusBar::new(&app.theme).left(left).right(right).render(f, area);
}

/// Draw help overlay.
fn draw_help_overlay(f: &mut Frame, app: &AppState) {
    let area = centered_rect(60, 70, f.area());

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/Down    Next conversation (or message when focused)"),
        Line::from("  k/Up      Previous conversation (or message when focused)"),
        Line::from("  J / K     Next / previous message"),
        Line::from("  Tab       Switch panel"),
        Line::from(""),
        Line::from("Editing:"),
        Line::from("  e/Enter   Edit message under cursor"),
        Line::from("  Enter     Save edit"),
        Line::from("  Ctrl+J    Insert newline"),
        Line::from("  Esc       Cancel edit"),
        Line::from(""),
        Line::from("Search:"),
        Line::from("  /         Start search"),
        Line::from("  Enter     Keep results"),
        Line::from("  Esc       Clear search"),
        Line::from(""),
        Line::from("Actions:"),
        Line::from(format!("  w         Write export to {}", app.output.display())),
        Line::from("  r         Reload from disk"),
        Line::from("  x         Toggle parse errors"),
        Line::from(format!("  Themes    {}", available_themes().join("/"))),
        Line::from(""),
        Line::from("  q         Quit"),
        Line::from("  ?         Toggle help"),
    ];

    let paragraph = Paragraph::new(help_text).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(app.theme.border_style(true)),
    );

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Append `text` to the line being built, starting a new line at every `\n`.
fn push_text<'a>(text: &'a str, current: &mut Vec<Span<'a>>, lines: &mut Vec<Line<'a>>) {
    let mut parts = text.split('\n');
    if let Some(first) = parts.next() {
        current.push(Span::raw(first));
    }
    for part in parts {
        lines.push(Line::from(std::mem::take(current)));
        current.push(Span::raw(part));
    }
}

/// Split a string at a character index.
fn split_at_char(s: &str, char_idx: usize) -> (&str, &str) {
    let at = s.char_indices().nth(char_idx).map_or(s.len(), |(b, _)| b);
    s.split_at(at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::theme::Theme;
    use ratatui::backend::TestBackend;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content.iter().map(|c| c.symbol()).collect()
    }

    fn app() -> AppState {
        let mut session = Session::new();
        session
            .import_str("{\"messages\":[{\"role\":\"user\",\"content\":\"hi\"}]}\nnot json")
            .unwrap();
        AppState::new(
            session,
            TuiOptions {
                output: "out.jsonl".into(),
                theme: Theme::dark(),
                ascii: true,
                show_errors: true,
            },
        )
    }

    #[test]
    fn test_draw_panels() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let app = app();
        draw(&mut terminal, &app).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Conversation 1"));
        assert!(text.contains("Parse errors (1)"));
        assert!(text.contains("user"));
    }

    #[test]
    fn test_draw_editor_and_tiny_terminal() {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

        let mut app = app();
        app.handle_key(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        draw(&mut terminal, &app).unwrap();
        assert!(buffer_text(&terminal).contains("Edit Conversation 1"));

        let mut tiny = Terminal::new(TestBackend::new(10, 3)).unwrap();
        draw(&mut tiny, &app).unwrap();
    }

    #[test]
    fn test_split_at_char() {
        assert_eq!(split_at_char("héllo", 2), ("hé", "llo"));
        assert_eq!(split_at_char("hi", 9), ("hi", ""));
    }
}

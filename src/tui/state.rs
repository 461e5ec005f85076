//! TUI application state and key handling.
//!
//! All input handling lives here, separate from drawing, so the editor's
//! behaviour can be driven and checked without a terminal.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::label;
use crate::session::{Notice, NoticeLevel, Session};
use crate::store::ConversationId;

use super::components::Symbols;
use super::events::KeyBindings;
use super::theme::Theme;

/// Input mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Navigation and commands.
    Normal,
    /// Typing a search query; the view updates on every key.
    Search,
    /// Typing a replacement for one message.
    Edit,
}

/// Focused panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Conversation list.
    List,
    /// Messages of the selected conversation.
    Detail,
    /// Parse errors.
    Errors,
}

/// What the event loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep running.
    Continue,
    /// Leave the TUI.
    Quit,
}

/// Display options for the TUI.
#[derive(Debug, Clone)]
pub struct TuiOptions {
    /// File written by the export key.
    pub output: PathBuf,
    /// Color theme.
    pub theme: Theme,
    /// Use ASCII-only glyphs.
    pub ascii: bool,
    /// Start with the parse error panel open.
    pub show_errors: bool,
}

/// Application state.
pub struct AppState {
    /// The editing session.
    pub session: Session,
    /// Current input mode.
    pub mode: Mode,
    /// Focused panel.
    pub focus: Focus,
    /// Current theme.
    pub theme: Theme,
    /// Glyph set.
    pub symbols: Symbols,
    /// Export target.
    pub output: PathBuf,
    /// Index of the message under the cursor in the detail panel.
    pub message_cursor: usize,
    /// Caret position in the draft, in characters.
    pub caret: usize,
    /// Show the parse error panel.
    pub show_errors: bool,
    /// Show help overlay.
    pub show_help: bool,
    /// Scroll offset of the parse error panel.
    pub errors_scroll: usize,
    /// Latest notice, cleared on the next key.
    pub status: Option<Notice>,
    bindings: KeyBindings,
    /// Set after a quit with unsaved edits; a second quit confirms.
    quit_armed: bool,
    /// Set after a reload with unsaved edits; a second reload confirms.
    reload_armed: bool,
    last_selected: Option<ConversationId>,
}

impl AppState {
    /// Wrap an already-imported session.
    pub fn new(session: Session, options: TuiOptions) -> Self {
        let mut state = Self {
            session,
            mode: Mode::Normal,
            focus: Focus::List,
            theme: options.theme,
            symbols: Symbols::new(options.ascii),
            output: options.output,
            message_cursor: 0,
            caret: 0,
            show_errors: options.show_errors,
            show_help: false,
            errors_scroll: 0,
            status: None,
            bindings: KeyBindings::default(),
            quit_armed: false,
            reload_armed: false,
            last_selected: None,
        };
        state.sync();
        state
    }

    /// Handle one key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        self.status = None;

        let action = match self.mode {
            Mode::Search => {
                self.handle_search_key(key);
                Action::Continue
            }
            Mode::Edit => {
                self.handle_edit_key(key);
                Action::Continue
            }
            Mode::Normal if self.show_help => {
                if self.bindings.is_back(&key)
                    || self.bindings.is_help(&key)
                    || self.bindings.is_quit(&key)
                {
                    self.show_help = false;
                }
                Action::Continue
            }
            Mode::Normal => self.handle_normal_key(key),
        };

        self.sync();
        action
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Action {
        let b = &self.bindings;

        if b.is_quit(&key) {
            self.reload_armed = false;
            return self.request_quit();
        }
        self.quit_armed = false;
        if !b.is_reload(&key) {
            self.reload_armed = false;
        }

        if b.is_up(&key) {
            self.move_vertical(-1);
        } else if b.is_down(&key) {
            self.move_vertical(1);
        } else if b.is_message_up(&key) {
            self.move_message_cursor(-1);
        } else if b.is_message_down(&key) {
            self.move_message_cursor(1);
        } else if b.is_focus(&key) {
            self.cycle_focus();
        } else if b.is_edit(&key) {
            self.begin_edit();
        } else if b.is_search(&key) {
            self.mode = Mode::Search;
        } else if b.is_write(&key) {
            let output = self.output.clone();
            // Failures are queued as notices by the session.
            let _ = self.session.export_to(&output);
        } else if b.is_reload(&key) {
            self.reload();
        } else if b.is_toggle_errors(&key) {
            self.show_errors = !self.show_errors;
            if !self.show_errors && self.focus == Focus::Errors {
                self.focus = Focus::List;
            }
        } else if b.is_help(&key) {
            self.show_help = true;
        } else if b.is_back(&key) {
            self.session.store_mut().clear_query();
        }

        Action::Continue
    }

    fn request_quit(&mut self) -> Action {
        if self.session.store().is_modified() && !self.quit_armed {
            self.quit_armed = true;
            self.set_status(
                NoticeLevel::Warning,
                "Unsaved edits: press q again to quit, or w to write",
            );
            return Action::Continue;
        }
        Action::Quit
    }

    fn move_vertical(&mut self, delta: isize) {
        match self.focus {
            Focus::List => {
                let store = self.session.store_mut();
                if delta < 0 {
                    store.select_previous();
                } else {
                    store.select_next();
                }
            }
            Focus::Detail => self.move_message_cursor(delta),
            Focus::Errors => {
                self.errors_scroll = self.errors_scroll.saturating_add_signed(delta);
            }
        }
    }

    fn move_message_cursor(&mut self, delta: isize) {
        self.message_cursor = self.message_cursor.saturating_add_signed(delta);
        self.clamp_message_cursor();
    }

    fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::List => Focus::Detail,
            Focus::Detail if self.show_errors => Focus::Errors,
            Focus::Detail | Focus::Errors => Focus::List,
        };
    }

    fn begin_edit(&mut self) {
        match self.session.store_mut().begin_edit(self.message_cursor) {
            Ok(()) => {
                self.mode = Mode::Edit;
                self.caret = self.session.store().draft().map_or(0, |d| d.chars().count());
            }
            Err(e) => self.set_status(NoticeLevel::Error, e.to_string()),
        }
    }

    fn reload(&mut self) {
        let Some(source) = self.session.source().map(PathBuf::from) else {
            self.set_status(NoticeLevel::Warning, "No source file to reload");
            return;
        };
        if self.session.store().is_modified() && !self.reload_armed {
            self.reload_armed = true;
            self.set_status(
                NoticeLevel::Warning,
                "Unsaved edits: press r again to discard them and reload",
            );
            return;
        }
        self.reload_armed = false;
        if let Ok(summary) = self.session.import_file(&source) {
            self.session.notify(
                NoticeLevel::Info,
                format!("Reloaded {} conversations", summary.conversations),
            );
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let store = self.session.store_mut();
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => {
                store.clear_query();
                self.mode = Mode::Normal;
            }
            (_, KeyCode::Enter) => self.mode = Mode::Normal,
            (_, KeyCode::Up) => store.select_previous(),
            (_, KeyCode::Down) => store.select_next(),
            (_, KeyCode::Backspace) => {
                let mut query = store.query().to_string();
                query.pop();
                store.set_query(query);
            }
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                let mut query = store.query().to_string();
                query.push(c);
                store.set_query(query);
            }
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => {
                self.session.store_mut().cancel_edit();
                self.mode = Mode::Normal;
            }
            (KeyModifiers::CONTROL, KeyCode::Char('j')) | (KeyModifiers::ALT, KeyCode::Enter) => {
                self.insert_char('\n');
            }
            (_, KeyCode::Enter) => self.commit_edit(),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => self.insert_char(c),
            (_, KeyCode::Backspace) => {
                if self.caret > 0 {
                    self.caret -= 1;
                    self.remove_char_at(self.caret);
                }
            }
            (_, KeyCode::Delete) => self.remove_char_at(self.caret),
            (_, KeyCode::Left) => self.caret = self.caret.saturating_sub(1),
            (_, KeyCode::Right) => self.caret = (self.caret + 1).min(self.draft_len()),
            (_, KeyCode::Home) => self.caret = 0,
            (_, KeyCode::End) => self.caret = self.draft_len(),
            _ => {}
        }
    }

    fn commit_edit(&mut self) {
        match self.session.commit_edit() {
            Ok(outcome) => {
                let position = self
                    .session
                    .store()
                    .position_of(outcome.conversation)
                    .unwrap_or_default();
                self.session.notify(
                    NoticeLevel::Info,
                    format!("Edited {}, message {}", label(position), outcome.message),
                );
                self.mode = Mode::Normal;
            }
            Err(e) => self.set_status(NoticeLevel::Error, e.to_string()),
        }
    }

    fn draft_len(&self) -> usize {
        self.session.store().draft().map_or(0, |d| d.chars().count())
    }

    fn insert_char(&mut self, c: char) {
        let caret = self.caret;
        if let Some(draft) = self.session.store_mut().draft_mut() {
            let at = byte_index(draft, caret);
            draft.insert(at, c);
            self.caret += 1;
        }
    }

    fn remove_char_at(&mut self, char_idx: usize) {
        if let Some(draft) = self.session.store_mut().draft_mut() {
            if char_idx < draft.chars().count() {
                let at = byte_index(draft, char_idx);
                draft.remove(at);
            }
        }
    }

    fn set_status(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.status = Some(Notice {
            level,
            message: message.into(),
        });
    }

    fn clamp_message_cursor(&mut self) {
        let len = self
            .session
            .store()
            .selected()
            .map_or(0, |s| s.conversation.len());
        self.message_cursor = self.message_cursor.min(len.saturating_sub(1));
    }

    /// Bring derived UI state in line with the store after any change.
    fn sync(&mut self) {
        if self.mode == Mode::Edit && self.session.store().edit_state().is_none() {
            self.mode = Mode::Normal;
        }

        let selected = self.session.store().selected_id();
        if selected != self.last_selected {
            self.last_selected = selected;
            self.message_cursor = 0;
        }
        self.clamp_message_cursor();

        let errors = self.session.store().errors().len();
        self.errors_scroll = self.errors_scroll.min(errors.saturating_sub(1));

        if let Some(notice) = self.session.take_notices().pop() {
            self.status = Some(notice);
        }
    }
}

/// Byte offset of the `char_idx`-th character, or the end of the string.
fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(b, _)| b)
}

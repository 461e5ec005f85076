//! TUI event handling.
//!
//! A background thread polls crossterm and feeds an mpsc channel so the main
//! loop only ever blocks on `recv`.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Application events.
#[derive(Debug, Clone)]
pub enum Event {
    /// Terminal tick, sent after every poll interval.
    Tick,
    /// Key press event.
    Key(KeyEvent),
    /// Terminal resize.
    Resize(u16, u16),
}

/// Event handler using channels.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    /// Start the input thread.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            if event::poll(tick_rate).unwrap_or(false) {
                let forwarded = match event::read() {
                    // Windows reports releases too; only presses drive the editor.
                    Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        Some(Event::Key(key))
                    }
                    Ok(CrosstermEvent::Resize(w, h)) => Some(Event::Resize(w, h)),
                    _ => None,
                };
                if let Some(event) = forwarded {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            }

            if tx.send(Event::Tick).is_err() {
                break;
            }
        });

        Self { rx }
    }

    /// Get the next event.
    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}

/// Key binding configuration for normal mode.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    /// Quit keys.
    pub quit: Vec<KeyEvent>,
    /// Navigation up.
    pub up: Vec<KeyEvent>,
    /// Navigation down.
    pub down: Vec<KeyEvent>,
    /// Previous message.
    pub message_up: Vec<KeyEvent>,
    /// Next message.
    pub message_down: Vec<KeyEvent>,
    /// Switch panel focus.
    pub focus: Vec<KeyEvent>,
    /// Start editing.
    pub edit: Vec<KeyEvent>,
    /// Start searching.
    pub search: Vec<KeyEvent>,
    /// Write the export.
    pub write: Vec<KeyEvent>,
    /// Re-import the source file.
    pub reload: Vec<KeyEvent>,
    /// Toggle the parse error panel.
    pub toggle_errors: Vec<KeyEvent>,
    /// Toggle help.
    pub help: Vec<KeyEvent>,
    /// Back/cancel.
    pub back: Vec<KeyEvent>,
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn shifted(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT)
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: vec![
                key(KeyCode::Char('q')),
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            ],
            up: vec![key(KeyCode::Up), key(KeyCode::Char('k'))],
            down: vec![key(KeyCode::Down), key(KeyCode::Char('j'))],
            message_up: vec![shifted('K'), key(KeyCode::Char('K'))],
            message_down: vec![shifted('J'), key(KeyCode::Char('J'))],
            focus: vec![key(KeyCode::Tab), key(KeyCode::BackTab), shifted('\t')],
            edit: vec![key(KeyCode::Char('e')), key(KeyCode::Enter)],
            search: vec![key(KeyCode::Char('/'))],
            write: vec![key(KeyCode::Char('w'))],
            reload: vec![key(KeyCode::Char('r'))],
            toggle_errors: vec![key(KeyCode::Char('x'))],
            help: vec![key(KeyCode::Char('?')), shifted('?')],
            back: vec![key(KeyCode::Esc)],
        }
    }
}

fn matches(bindings: &[KeyEvent], key: &KeyEvent) -> bool {
    bindings
        .iter()
        .any(|k| k.code == key.code && k.modifiers == key.modifiers)
}

impl KeyBindings {
    /// Check if a key matches quit binding.
    pub fn is_quit(&self, key: &KeyEvent) -> bool {
        matches(&self.quit, key)
    }

    /// Check if a key matches up binding.
    pub fn is_up(&self, key: &KeyEvent) -> bool {
        matches(&self.up, key)
    }

    /// Check if a key matches down binding.
    pub fn is_down(&self, key: &KeyEvent) -> bool {
        matches(&self.down, key)
    }

    /// Check if a key moves the message cursor up.
    pub fn is_message_up(&self, key: &KeyEvent) -> bool {
        matches(&self.message_up, key)
    }

    /// Check if a key moves the message cursor down.
    pub fn is_message_down(&self, key: &KeyEvent) -> bool {
        matches(&self.message_down, key)
    }

    /// Check if a key switches focus.
    pub fn is_focus(&self, key: &KeyEvent) -> bool {
        matches(&self.focus, key)
    }

    /// Check if a key starts editing.
    pub fn is_edit(&self, key: &KeyEvent) -> bool {
        matches(&self.edit, key)
    }

    /// Check if a key starts a search.
    pub fn is_search(&self, key: &KeyEvent) -> bool {
        matches(&self.search, key)
    }

    /// Check if a key writes the export.
    pub fn is_write(&self, key: &KeyEvent) -> bool {
        matches(&self.write, key)
    }

    /// Check if a key reloads the source.
    pub fn is_reload(&self, key: &KeyEvent) -> bool {
        matches(&self.reload, key)
    }

    /// Check if a key toggles the error panel.
    pub fn is_toggle_errors(&self, key: &KeyEvent) -> bool {
        matches(&self.toggle_errors, key)
    }

    /// Check if a key toggles help.
    pub fn is_help(&self, key: &KeyEvent) -> bool {
        matches(&self.help, key)
    }

    /// Check if a key matches back binding.
    pub fn is_back(&self, key: &KeyEvent) -> bool {
        matches(&self.back, key)
    }
}

//! Reusable TUI components.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::model::Message;

use super::theme::Theme;

/// Glyphs used by the panels, in a Unicode and an ASCII flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbols {
    /// Marks the selected list entry.
    pub selected: &'static str,
    /// Marks the message under the cursor.
    pub cursor: &'static str,
    /// Marks a message with an edit in progress.
    pub editing: &'static str,
    /// Text cursor in input fields.
    pub caret: &'static str,
    /// Separator in the status bar.
    pub separator: &'static str,
}

impl Symbols {
    /// Unicode glyphs.
    pub const UNICODE: Self = Self {
        selected: "▶ ",
        cursor: "›",
        editing: "✎",
        caret: "█",
        separator: "│",
    };

    /// ASCII-only glyphs.
    pub const ASCII: Self = Self {
        selected: "> ",
        cursor: ">",
        editing: "*",
        caret: "_",
        separator: "|",
    };

    /// Pick a flavour.
    #[must_use]
    pub const fn new(ascii: bool) -> Self {
        if ascii {
            Self::ASCII
        } else {
            Self::UNICODE
        }
    }
}

impl Default for Symbols {
    fn default() -> Self {
        Self::UNICODE
    }
}

/// A scrollable text view.
pub struct ScrollableText<'a> {
    title: String,
    content: Vec<Line<'a>>,
    scroll: usize,
    focused: bool,
    border_style: Style,
    focused_style: Style,
}

impl<'a> ScrollableText<'a> {
    /// Create a new scrollable text view.
    pub fn new(title: impl Into<String>, theme: &Theme) -> Self {
        Self {
            title: title.into(),
            content: Vec::new(),
            scroll: 0,
            focused: false,
            border_style: theme.border_style(false),
            focused_style: theme.border_style(true),
        }
    }

    /// Set content.
    #[must_use]
    pub fn content(mut self, content: Vec<Line<'a>>) -> Self {
        self.content = content;
        self
    }

    /// Set scroll position.
    #[must_use]
    pub const fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Set focused state.
    #[must_use]
    pub const fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Render the component.
    pub fn render(self, f: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            self.focused_style
        } else {
            self.border_style
        };

        let paragraph = Paragraph::new(self.content)
            .block(
                Block::default()
                    .title(self.title)
                    .borders(Borders::ALL)
                    .border_style(border_style),
            )
            .wrap(Wrap { trim: false })
            .scroll((u16::try_from(self.scroll).unwrap_or(u16::MAX), 0));

        f.render_widget(paragraph, area);
    }
}

/// A status bar component.
pub struct StatusBar<'a> {
    left: Vec<Span<'a>>,
    right: Vec<Span<'a>>,
    style: Style,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar.
    pub fn new(theme: &Theme) -> Self {
        Self {
            left: Vec::new(),
            right: Vec::new(),
            style: Style::default().bg(theme.border).fg(theme.foreground),
        }
    }

    /// Add left-aligned content.
    #[must_use]
    pub fn left(mut self, spans: Vec<Span<'a>>) -> Self {
        self.left = spans;
        self
    }

    /// Add right-aligned content.
    #[must_use]
    pub fn right(mut self, spans: Vec<Span<'a>>) -> Self {
        self.right = spans;
        self
    }

    /// Render the status bar.
    pub fn render(self, f: &mut Frame, area: Rect) {
        let used: usize = self
            .left
            .iter()
            .chain(self.right.iter())
            .map(|s| s.content.chars().count())
            .sum();
        let padding = usize::from(area.width).saturating_sub(used).max(1);

        let mut spans = self.left;
        spans.push(Span::raw(" ".repeat(padding)));
        spans.extend(self.right);

        let paragraph = Paragraph::new(Line::from(spans)).style(self.style);
        f.render_widget(paragraph, area);
    }
}

/// Header line for a message in the detail panel.
pub fn message_header(
    index: usize,
    message: &Message,
    theme: &Theme,
    symbols: Symbols,
    under_cursor: bool,
    editing: bool,
) -> Line<'static> {
    let marker = if under_cursor { symbols.cursor } else { " " };
    let mut spans = vec![
        Span::styled(marker.to_string(), Style::default().fg(theme.primary)),
        Span::raw(format!("[{index}] ")),
        Span::styled(message.role.clone(), theme.role_style(message.role_kind())),
    ];
    if editing {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!("{} editing", symbols.editing),
            theme.warning_style().add_modifier(Modifier::ITALIC),
        ));
    }
    Line::from(spans)
}

/// Body lines for a message, indented under its header.
pub fn message_body(content: &str) -> Vec<Line<'static>> {
    if content.is_empty() {
        return vec![Line::styled(
            "    (empty)",
            Style::default().add_modifier(Modifier::DIM),
        )];
    }
    content.lines().map(|line| Line::from(format!("    {line}"))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_flavour() {
        assert_eq!(Symbols::new(true), Symbols::ASCII);
        assert_eq!(Symbols::new(false), Symbols::UNICODE);
        assert!(Symbols::ASCII.selected.is_ascii());
    }

    #[test]
    fn test_message_header_marks_editing() {
        let message = Message::new("user", "hi");
        let line = message_header(2, &message, &Theme::dark(), Symbols::ASCII, true, true);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, ">[2] user * editing");
    }

    #[test]
    fn test_message_body_indents() {
        assert_eq!(message_body("a\nb").len(), 2);
        assert_eq!(message_body("").len(), 1);
    }
}

//! TUI theming and colors.

use ratatui::style::{Color, Modifier, Style};

use crate::model::RoleKind;
use crate::session::NoticeLevel;

/// Application theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Name of the theme.
    pub name: String,
    /// Foreground color.
    pub foreground: Color,
    /// Primary accent color.
    pub primary: Color,
    /// Secondary accent color.
    pub secondary: Color,
    /// Border color (unfocused).
    pub border: Color,
    /// Border color (focused).
    pub border_focused: Color,
    /// Selection highlight.
    pub selection: Color,
    /// User message color.
    pub user: Color,
    /// Assistant message color.
    pub assistant: Color,
    /// System message color.
    pub system: Color,
    /// Error color.
    pub error: Color,
    /// Warning color.
    pub warning: Color,
    /// Success color.
    pub success: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Create the default dark theme.
    #[must_use]
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            foreground: Color::White,
            primary: Color::Cyan,
            secondary: Color::Magenta,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            selection: Color::DarkGray,
            user: Color::Green,
            assistant: Color::Blue,
            system: Color::Yellow,
            error: Color::Red,
            warning: Color::Yellow,
            success: Color::Green,
        }
    }

    /// Create a light theme.
    #[must_use]
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            foreground: Color::Black,
            primary: Color::Blue,
            secondary: Color::Magenta,
            border: Color::Gray,
            border_focused: Color::Blue,
            selection: Color::LightBlue,
            user: Color::Green,
            assistant: Color::Blue,
            system: Color::Yellow,
            error: Color::Red,
            warning: Color::Yellow,
            success: Color::Green,
        }
    }

    /// Create a high contrast theme.
    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            name: "high-contrast".to_string(),
            foreground: Color::White,
            primary: Color::Yellow,
            secondary: Color::Cyan,
            border: Color::White,
            border_focused: Color::Yellow,
            selection: Color::White,
            user: Color::Green,
            assistant: Color::Cyan,
            system: Color::Yellow,
            error: Color::Red,
            warning: Color::Yellow,
            success: Color::Green,
        }
    }

    /// A theme that leaves every color to the terminal.
    #[must_use]
    pub fn monochrome() -> Self {
        Self {
            name: "monochrome".to_string(),
            foreground: Color::Reset,
            primary: Color::Reset,
            secondary: Color::Reset,
            border: Color::Reset,
            border_focused: Color::Reset,
            selection: Color::Reset,
            user: Color::Reset,
            assistant: Color::Reset,
            system: Color::Reset,
            error: Color::Reset,
            warning: Color::Reset,
            success: Color::Reset,
        }
    }

    /// Get theme by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            "high-contrast" | "highcontrast" => Some(Self::high_contrast()),
            "monochrome" | "none" => Some(Self::monochrome()),
            _ => None,
        }
    }

    /// Get style for a panel border.
    #[must_use]
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused)
        } else {
            Style::default().fg(self.border)
        }
    }

    /// Get style for selected items.
    #[must_use]
    pub fn selection_style(&self) -> Style {
        // Monochrome themes rely on reverse video instead of a background color.
        if self.selection == Color::Reset {
            return Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        Style::default()
            .bg(self.selection)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for a message header by role.
    #[must_use]
    pub fn role_style(&self, role: RoleKind) -> Style {
        let color = match role {
            RoleKind::User => self.user,
            RoleKind::Assistant => self.assistant,
            RoleKind::System => self.system,
            RoleKind::Other => self.secondary,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Get style for errors.
    #[must_use]
    pub fn error_style(&self) -> Style {
        Style::default()
            .fg(self.error)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for warnings.
    #[must_use]
    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    /// Get style for success.
    #[must_use]
    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    /// Get style for a session notice.
    #[must_use]
    pub fn notice_style(&self, level: NoticeLevel) -> Style {
        match level {
            NoticeLevel::Info => self.success_style(),
            NoticeLevel::Warning => self.warning_style(),
            NoticeLevel::Error => self.error_style(),
        }
    }
}

/// Available themes list.
#[must_use]
pub fn available_themes() -> Vec<&'static str> {
    vec!["dark", "light", "high-contrast", "monochrome"]
}
